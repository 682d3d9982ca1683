use super::*;

#[test]
fn mul_div255_rounds() {
    assert_eq!(mul_div255_u16(255, 255), 255);
    assert_eq!(mul_div255_u16(128, 255), 128);
    assert_eq!(mul_div255_u8(255, 0), 0);
}

#[test]
fn signed_degrees_range() {
    assert_eq!(normalize_signed_degrees(0.0), 0.0);
    assert_eq!(normalize_signed_degrees(180.0), 180.0);
    assert_eq!(normalize_signed_degrees(-180.0), 180.0);
    assert_eq!(normalize_signed_degrees(270.0), -90.0);
    assert_eq!(normalize_signed_degrees(-190.0), 170.0);
    assert_eq!(normalize_signed_degrees(720.0 + 45.0), 45.0);
}

#[test]
fn progress_is_clamped_and_nan_is_start() {
    assert_eq!(unit_progress(f64::NAN), 0.0);
    assert_eq!(unit_progress(f64::INFINITY), 0.0);
    assert_eq!(unit_progress(1.5), 1.0);
    assert_eq!(unit_progress(-0.5), 0.0);
    assert_eq!(unit_progress(0.25), 0.25);
}
