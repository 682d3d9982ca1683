use super::*;

fn view() -> MapView {
    MapView::new(Canvas {
        width: 800,
        height: 600,
    })
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6
}

#[test]
fn mercator_round_trips() {
    for c in [
        LngLat::new(0.0, 0.0),
        LngLat::new(-74.0, 40.7),
        LngLat::new(151.2, -33.9),
    ] {
        let (x, y) = mercator(c);
        let back = inverse_mercator(x, y);
        assert!((back.lon - c.lon).abs() < 1e-9);
        assert!((back.lat - c.lat).abs() < 1e-9);
    }
    assert_eq!(mercator(LngLat::new(0.0, 0.0)), (256.0, 256.0));
}

#[test]
fn center_projects_to_canvas_middle() {
    let mut v = view();
    for pitch in [0.0, 30.0, 55.0] {
        v.jump_to(CameraPose {
            center: LngLat::new(10.0, 45.0),
            zoom: 6.0,
            pitch_deg: pitch,
            bearing_deg: 25.0,
        });
        let p = v.project(LngLat::new(10.0, 45.0)).unwrap();
        assert!(close(p, Point::new(400.0, 300.0)));
    }
}

#[test]
fn north_is_up_without_bearing_and_east_is_up_at_bearing_90() {
    let mut v = view();
    v.jump_to(CameraPose {
        zoom: 5.0,
        ..CameraPose::default()
    });
    let north = v.project(LngLat::new(0.0, 1.0)).unwrap();
    assert!(north.y < 300.0);
    assert!((north.x - 400.0).abs() < 1e-9);

    v.jump_to(CameraPose {
        zoom: 5.0,
        bearing_deg: 90.0,
        ..CameraPose::default()
    });
    let east = v.project(LngLat::new(1.0, 0.0)).unwrap();
    assert!(east.y < 300.0);
    assert!((east.x - 400.0).abs() < 1e-6);
}

#[test]
fn pitched_points_behind_camera_do_not_project() {
    let mut v = view();
    v.jump_to(CameraPose {
        zoom: 10.0,
        pitch_deg: 60.0,
        ..CameraPose::default()
    });
    assert!(v.project(LngLat::new(0.0, -20.0)).is_none());
    let far_north = v.project(LngLat::new(0.0, 20.0)).unwrap();
    assert!(far_north.y < 0.0);
}

#[test]
fn pose_is_clamped() {
    let mut v = view();
    v.jump_to(CameraPose {
        zoom: 40.0,
        pitch_deg: 89.0,
        ..CameraPose::default()
    });
    assert_eq!(v.pose().zoom, 22.0);
    assert_eq!(v.pose().pitch_deg, 60.0);
}

#[test]
fn fit_bounds_keeps_corners_on_canvas() {
    let mut v = view();
    let bounds = LngLatBounds {
        min: LngLat::new(-10.0, 35.0),
        max: LngLat::new(30.0, 60.0),
    };
    v.fit_bounds(bounds, 80.0, 0.0);
    for c in [bounds.min, bounds.max] {
        let p = v.project(c).unwrap();
        assert!(p.x >= 79.0 && p.x <= 721.0, "{p:?}");
        assert!(p.y >= 79.0 && p.y <= 521.0, "{p:?}");
    }
    assert_eq!(v.pose().bearing_deg, 0.0);
}
