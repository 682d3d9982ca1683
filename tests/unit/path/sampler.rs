use super::*;
use crate::path::clock::DurationPolicy;

const EARTH_RADIUS_KM: f64 = 6371.0088;

fn equator_path(km: f64) -> Arc<Path> {
    let lon = km / (EARTH_RADIUS_KM * std::f64::consts::PI / 180.0);
    Arc::new(
        Path::new(vec![
            LngLat::new(0.0, 0.0),
            LngLat::new(lon * 0.1, 0.0),
            LngLat::new(lon, 0.0),
        ])
        .unwrap(),
    )
}

fn secs(v: f64) -> Duration {
    Duration::from_secs_f64(v)
}

#[test]
fn sample_endpoints_are_exact() {
    let path = equator_path(1000.0);
    let s0 = sample(&path, 0.0, 0.01);
    let s1 = sample(&path, 1.0, 0.01);
    assert_eq!(s0.coordinate, path.start());
    assert_eq!(s1.coordinate, path.end());
    assert!(s0.bearing_deg.is_some());
    assert_eq!(s1.bearing_deg, None);
}

#[test]
fn sample_heads_east_along_equator() {
    let path = equator_path(1000.0);
    let s = sample(&path, 0.3, 0.01);
    let b = s.bearing_deg.unwrap();
    assert!((b - 90.0).abs() < 1e-6, "bearing {b}");
}

#[test]
fn halfway_scenario() {
    let path = equator_path(1000.0);
    let total = DurationPolicy::default().total_duration(path.length_km(), 1.0);
    assert_eq!(total, secs(8.0));

    let mut sched = FrameScheduler::new();
    let mut sampler = PathSampler::new(0.01);
    sampler.start(&mut sched, "tick", path.clone(), total);

    let (h, _) = sched.take_due(secs(10.0)).pop().unwrap();
    let first = sampler.tick(&mut sched, h, secs(10.0), "tick").unwrap();
    assert_eq!(first.position.progress, 0.0);

    let (h, _) = sched.take_due(secs(14.0)).pop().unwrap();
    let mid = sampler.tick(&mut sched, h, secs(14.0), "tick").unwrap();
    assert!((mid.position.progress - 0.5).abs() < 1e-12);
    assert!((mid.position.distance_km - 500.0).abs() < 1e-3);
    assert!(!mid.completed);
}

#[test]
fn completion_fires_once_and_stops_scheduling() {
    let path = equator_path(200.0);
    let mut sched = FrameScheduler::new();
    let mut sampler = PathSampler::new(0.01);
    sampler.start(&mut sched, (), path, secs(1.0));

    let mut completions = 0;
    let mut now = 0.0;
    while !sched.is_idle() {
        for (h, ()) in sched.take_due(secs(now)) {
            if let Some(t) = sampler.tick(&mut sched, h, secs(now), ()) {
                completions += usize::from(t.completed);
            }
        }
        now += 0.25;
    }
    assert_eq!(completions, 1);
    assert!(!sampler.is_running());
    assert_eq!(sampler.progress(), 1.0);
}

#[test]
fn stop_is_idempotent_and_drops_stale_handles() {
    let path = equator_path(200.0);
    let mut sched = FrameScheduler::new();
    let mut sampler = PathSampler::new(0.01);
    sampler.start(&mut sched, (), path.clone(), secs(1.0));
    let (h, ()) = sched.take_due(secs(0.0)).pop().unwrap();
    sampler.tick(&mut sched, h, secs(0.0), ());

    assert!(sampler.stop(&mut sched));
    assert!(!sampler.stop(&mut sched));
    assert!(sched.is_idle());
    // A handle from before the stop never advances the run.
    assert!(sampler.tick(&mut sched, h, secs(0.5), ()).is_none());

    sampler.start(&mut sched, (), path, secs(1.0));
    assert!(sampler.tick(&mut sched, h, secs(0.5), ()).is_none());
    assert_eq!(sched.pending_len(), 1);
}

#[test]
fn reset_zeroes_progress() {
    let path = equator_path(200.0);
    let mut sched = FrameScheduler::new();
    let mut sampler = PathSampler::new(0.01);
    sampler.start(&mut sched, (), path, secs(1.0));
    for now in [0.0, 0.5] {
        let (h, ()) = sched.take_due(secs(now)).pop().unwrap();
        sampler.tick(&mut sched, h, secs(now), ());
    }
    assert!(sampler.progress() > 0.0);
    sampler.reset(&mut sched);
    assert_eq!(sampler.progress(), 0.0);
    assert!(sched.is_idle());
}
