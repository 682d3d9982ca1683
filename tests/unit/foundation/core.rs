use super::*;

#[test]
fn lnglat_serializes_as_geojson_pair() {
    let c = LngLat::new(13.4, 52.5);
    assert_eq!(serde_json::to_string(&c).unwrap(), "[13.4,52.5]");
    let back: LngLat = serde_json::from_str("[-0.12,51.5]").unwrap();
    assert_eq!(back, LngLat::new(-0.12, 51.5));
}

#[test]
fn lnglat_validity() {
    assert!(LngLat::new(0.0, 0.0).is_valid());
    assert!(!LngLat::new(0.0, 91.0).is_valid());
    assert!(!LngLat::new(f64::NAN, 0.0).is_valid());
}

#[test]
fn bounds_cover_all_coords() {
    let coords = [
        LngLat::new(2.0, 48.0),
        LngLat::new(-3.0, 50.0),
        LngLat::new(13.0, 40.0),
    ];
    let b = LngLatBounds::from_coords(&coords).unwrap();
    assert_eq!(b.min, LngLat::new(-3.0, 40.0));
    assert_eq!(b.max, LngLat::new(13.0, 50.0));
    assert_eq!(b.center(), LngLat::new(5.0, 45.0));
    assert!(LngLatBounds::from_coords(&[]).is_none());
}

#[test]
fn canvas_validation() {
    assert!(Canvas::default().validate().is_ok());
    assert!(
        Canvas {
            width: 0,
            height: 10
        }
        .validate()
        .is_err()
    );
    assert!(
        Canvas {
            width: 70_000,
            height: 10
        }
        .validate()
        .is_err()
    );
}

#[test]
fn fps_frame_duration() {
    let fps = Fps::new(30, 1).unwrap();
    assert!((fps.frame_duration().as_secs_f64() - 1.0 / 30.0).abs() < 1e-9);
    assert!((fps.frames_to_secs(45) - 1.5).abs() < 1e-12);
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn rgb_hex_roundtrip_to_css() {
    let c = Rgb8::from_hex(0x4285F4);
    assert_eq!((c.r, c.g, c.b), (0x42, 0x85, 0xF4));
    assert_eq!(c.to_css(), "#4285f4");
}
