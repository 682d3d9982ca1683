use super::*;

#[test]
fn new_transparent_has_expected_len() {
    let f = FrameRGBA::new_transparent(3, 2).unwrap();
    assert_eq!(f.data.len(), 24);
    assert!(f.data.iter().all(|&b| b == 0));
    assert!(f.premultiplied);
}

#[test]
fn from_raw_rejects_wrong_len() {
    assert!(FrameRGBA::from_raw(2, 2, vec![0; 15], true).is_err());
    assert!(FrameRGBA::from_raw(2, 2, vec![0; 16], true).is_ok());
}

#[test]
fn pixel_out_of_bounds_is_none() {
    let f = FrameRGBA::new_transparent(2, 2).unwrap();
    assert!(f.pixel(2, 0).is_none());
    assert!(f.pixel(0, 2).is_none());
    assert_eq!(f.pixel(1, 1), Some([0, 0, 0, 0]));
}

#[test]
fn straight_alpha_round_trips_opaque_and_half() {
    let mut f = FrameRGBA::new_transparent(2, 1).unwrap();
    f.data.copy_from_slice(&[10, 20, 30, 255, 64, 0, 0, 128]);
    let s = f.to_straight_rgba();
    assert_eq!(&s[..4], &[10, 20, 30, 255]);
    assert_eq!(s[7], 128);
    assert!((i32::from(s[4]) - 128).abs() <= 1);
}

#[test]
fn premul_helper_keeps_opaque_colors() {
    assert_eq!(premul_rgba8(12, 34, 56, 255), [12, 34, 56, 255]);
    assert_eq!(premul_rgba8(255, 255, 255, 0), [0, 0, 0, 0]);
}

#[test]
fn save_png_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut f = FrameRGBA::new_transparent(4, 4).unwrap();
    f.clear([255, 0, 0, 255]);
    let path = dir.path().join("f.png");
    f.save_png(&path).unwrap();
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(1, 1).0, [255, 0, 0, 255]);
}
