use super::*;

fn secs(v: f64) -> Duration {
    Duration::from_secs_f64(v)
}

#[test]
fn thousand_km_at_unit_speed_takes_min_duration() {
    let p = DurationPolicy::default();
    assert_eq!(p.total_duration(1000.0, 1.0), secs(8.0));
}

#[test]
fn long_paths_clamp_to_max() {
    let p = DurationPolicy::default();
    assert_eq!(p.total_duration(100_000.0, 1.0), secs(30.0));
    assert_eq!(p.total_duration(10_000.0, 1.0), secs(20.0));
}

#[test]
fn duration_decreases_with_speed_and_stays_in_bounds() {
    let p = DurationPolicy::default();
    let mut last = Duration::MAX;
    for step in 1..=10 {
        let speed = f64::from(step) * 0.5;
        for len in [10.0, 4_000.0, 50_000.0] {
            let d = p.total_duration(len, speed).as_secs_f64();
            assert!(d >= 8.0 / speed - 1e-9 && d <= 30.0 / speed + 1e-9);
        }
        let d = p.total_duration(7_000.0, speed);
        assert!(d < last);
        last = d;
    }
}

#[test]
fn invalid_speed_falls_back_to_unit() {
    let p = DurationPolicy::default();
    assert_eq!(p.total_duration(1000.0, 0.0), secs(8.0));
    assert_eq!(p.total_duration(1000.0, f64::NAN), secs(8.0));
}

#[test]
fn policy_validation() {
    assert!(DurationPolicy::default().validate().is_ok());
    let bad = DurationPolicy {
        min: secs(40.0),
        ..DurationPolicy::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn clock_starts_on_first_tick_and_clamps() {
    let mut c = AnimationClock::new(secs(8.0));
    assert_eq!(c.tick(secs(100.0)), 0.0);
    c.start();
    assert_eq!(c.tick(secs(100.0)), 0.0);
    assert!((c.tick(secs(104.0)) - 0.5).abs() < 1e-12);
    assert_eq!(c.tick(secs(120.0)), 1.0);
}

#[test]
fn progress_is_monotonic_and_reset_zeroes() {
    let mut c = AnimationClock::new(secs(10.0));
    c.start();
    c.tick(secs(0.0));
    let a = c.tick(secs(5.0));
    // A stale timestamp cannot move progress backwards.
    let b = c.tick(secs(3.0));
    assert!(b >= a);
    c.reset();
    assert_eq!(c.progress(), 0.0);
    assert!(!c.is_running());
}
