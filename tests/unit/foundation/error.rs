use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RoutecastError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(RoutecastError::render("x").to_string().contains("render error:"));
    assert!(
        RoutecastError::capture("x")
            .to_string()
            .contains("capture error:")
    );
    assert!(
        RoutecastError::service("x")
            .to_string()
            .contains("service error:")
    );
    assert!(
        RoutecastError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RoutecastError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn json_errors_map_to_serde() {
    let err: RoutecastError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, RoutecastError::Serde(_)));
}
