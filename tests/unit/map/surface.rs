use super::*;
use crate::map::view::CameraPose;

fn canvas() -> Canvas {
    Canvas {
        width: 200,
        height: 120,
    }
}

fn total_len(pieces: &[Vec<Point>]) -> f64 {
    pieces
        .iter()
        .map(|p| p.windows(2).map(|w| w[0].distance(w[1])).sum::<f64>())
        .sum()
}

#[test]
fn dash_run_splits_straight_line() {
    let run = [Point::new(0.0, 0.0), Point::new(20.0, 0.0)];
    let dashes = dash_run(&run, 3.0, 2.0);
    assert_eq!(dashes.len(), 4);
    assert!((total_len(&dashes) - 12.0).abs() < 1e-9);
    assert_eq!(dashes[1][0], Point::new(5.0, 0.0));
}

#[test]
fn dash_run_carries_phase_across_vertices() {
    let run = [
        Point::new(0.0, 0.0),
        Point::new(2.0, 0.0),
        Point::new(2.0, 8.0),
    ];
    let dashes = dash_run(&run, 3.0, 2.0);
    // First dash bends around the corner.
    assert_eq!(dashes[0].len(), 3);
    assert!((total_len(&dashes) - 6.0).abs() < 1e-9);
}

#[test]
fn dash_run_degenerate_inputs() {
    assert!(dash_run(&[Point::new(1.0, 1.0)], 3.0, 2.0).is_empty());
    assert!(dash_run(&[Point::ZERO, Point::new(5.0, 0.0)], 0.0, 2.0).is_empty());
    let solid = dash_run(&[Point::ZERO, Point::new(5.0, 0.0)], 1.0, 0.0);
    assert!((total_len(&solid) - 5.0).abs() < 1e-9);
}

#[test]
fn project_runs_break_on_unprojectable_points() {
    let mut view = MapView::new(canvas());
    view.jump_to(CameraPose {
        zoom: 10.0,
        pitch_deg: 60.0,
        ..CameraPose::default()
    });
    let coords = [
        LngLat::new(0.0, 0.01),
        LngLat::new(0.0, 0.0),
        LngLat::new(0.0, -30.0),
        LngLat::new(0.01, 0.0),
        LngLat::new(0.02, 0.0),
        LngLat::new(0.0, -40.0),
    ];
    let runs = project_runs(&view, &coords);
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().all(|r| r.len() == 2));
}

#[test]
fn render_draws_background_and_route() {
    let mut surface = MapSurface::new(canvas(), MapStyle::default()).unwrap();
    let mut view = MapView::new(canvas());
    view.jump_to(CameraPose {
        zoom: 8.0,
        ..CameraPose::default()
    });
    let route = Arc::new(Path::new(vec![LngLat::new(-0.1, 0.0), LngLat::new(0.1, 0.0)]).unwrap());
    let layers = RouteLayers {
        route: Some(route),
        trail: vec![LngLat::new(-0.1, 0.0), LngLat::new(0.0, 0.0)],
        stops: Vec::new(),
    };
    let frame = surface.render(&view, &layers).unwrap();
    assert_eq!((frame.width, frame.height), (200, 120));

    let corner = frame.pixel(1, 118).unwrap();
    assert_eq!(corner, [0xF2, 0xF1, 0xED, 255]);

    // Left of center sits on the blue trail, right of center only on the grey casing.
    let trail = frame.pixel(90, 60).unwrap();
    assert!(trail[2] > trail[0] + 60, "{trail:?}");
    let casing = frame.pixel(110, 60).unwrap();
    assert!(casing[0] < 0xF2, "{casing:?}");
}

#[test]
fn render_leaves_no_translucent_pixels() {
    let mut surface = MapSurface::new(canvas(), MapStyle::default()).unwrap();
    let mut view = MapView::new(canvas());
    view.jump_to(CameraPose {
        zoom: 6.0,
        bearing_deg: 17.0,
        ..CameraPose::default()
    });
    let route = Arc::new(
        Path::new(vec![
            LngLat::new(-1.3, -0.7),
            LngLat::new(0.2, 0.4),
            LngLat::new(1.1, -0.2),
        ])
        .unwrap(),
    );
    let layers = RouteLayers {
        trail: route.coords()[..2].to_vec(),
        route: Some(route),
        stops: vec![LngLat::new(0.2, 0.4)],
    };
    let frame = surface.render(&view, &layers).unwrap();
    for px in frame.data.chunks_exact(4) {
        assert_eq!(px[3], 255);
        assert!(px[0] <= px[3] && px[1] <= px[3] && px[2] <= px[3]);
    }
}

#[test]
fn render_places_stop_badges() {
    let mut surface = MapSurface::new(canvas(), MapStyle::default()).unwrap();
    let mut view = MapView::new(canvas());
    view.jump_to(CameraPose {
        zoom: 8.0,
        ..CameraPose::default()
    });
    let layers = RouteLayers {
        stops: vec![LngLat::new(0.0, 0.0)],
        ..RouteLayers::default()
    };
    let frame = surface.render(&view, &layers).unwrap();
    // Left ring of a 28px badge centred on (100, 60).
    let ring = frame.pixel(88, 60).unwrap();
    assert!(ring[2] > ring[0] + 60, "{ring:?}");
}

#[test]
fn graticule_step_shrinks_with_zoom() {
    assert!(graticule_step(2.0) > graticule_step(6.0));
    assert!(graticule_step(6.0) > graticule_step(12.0));
}
