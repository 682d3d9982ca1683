use super::*;

#[test]
fn badge_svg_carries_number_and_colour() {
    let svg = badge_svg(&BadgeStyle::default(), 3);
    assert!(svg.contains(">3</text>"));
    assert!(svg.contains("#4285f4"));
}

#[test]
fn badge_is_opaque_white_in_the_middle_and_clear_in_corners() {
    let mut cache = BadgeCache::new(BadgeStyle::default());
    let b = cache.badge(1).unwrap();
    assert_eq!((b.width, b.height), (28, 28));
    assert_eq!(b.pixel(0, 0), Some([0, 0, 0, 0]));
    // Ring pixel on the left edge at mid-height is border-coloured.
    let ring = b.pixel(2, 14).unwrap();
    assert!(ring[2] > ring[0] && ring[3] > 200);
}

#[test]
fn badges_are_cached_per_number() {
    let mut cache = BadgeCache::new(BadgeStyle::default());
    let a = cache.badge(2).unwrap();
    let b = cache.badge(2).unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    let c = cache.badge(3).unwrap();
    assert!(!Arc::ptr_eq(&a, &c));
}
