use super::*;

#[test]
fn parse_and_display_round_trip() {
    for k in VehicleKind::ALL {
        assert_eq!(k.to_string().parse::<VehicleKind>().unwrap(), k);
    }
    assert_eq!(" Ship ".parse::<VehicleKind>().unwrap(), VehicleKind::Ship);
    assert!("boat".parse::<VehicleKind>().is_err());
}

#[test]
fn serde_uses_lowercase_names() {
    let json = serde_json::to_string(&VehicleKind::Train).unwrap();
    assert_eq!(json, "\"train\"");
    let k: VehicleKind = serde_json::from_str("\"car\"").unwrap();
    assert_eq!(k, VehicleKind::Car);
}

#[test]
fn palettes_match_kind() {
    assert_eq!(VehicleKind::Plane.palette().primary, Rgb8::from_hex(0x3B82F6));
    assert_eq!(VehicleKind::Ship.palette().accent, Rgb8::from_hex(0x60A5FA));
    assert_eq!(WHEEL_COLOR, Rgb8::from_hex(0x1F2937));
}

#[test]
fn road_following_kinds() {
    assert!(VehicleKind::Car.follows_roads());
    assert!(VehicleKind::Train.follows_roads());
    assert!(!VehicleKind::Plane.follows_roads());
    assert!(!VehicleKind::Ship.follows_roads());
}

#[test]
fn pixel_size_rounds_base() {
    assert_eq!(vehicle_pixel_size(64, 1.0), 64);
    assert_eq!(vehicle_pixel_size(64, 1.5), 96);
    assert_eq!(vehicle_pixel_size(64, 0.5), 32);
    assert_eq!(vehicle_pixel_size(64, 1.3), 83);
}
