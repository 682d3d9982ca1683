use geo::{Haversine, InterpolatePoint};

use crate::foundation::core::LngLat;
use crate::foundation::error::RoutecastResult;
use crate::path::geometry::Path;

/// Points generated per leg, endpoints included.
pub const POINTS_PER_LEG: usize = 100;

/// Deterministic local path through `waypoints` along great-circle arcs.
///
/// Consecutive legs share their joining vertex once. Longitudes are unwrapped so a leg crossing
/// the antimeridian stays a single continuous line (values may leave `[-180, 180]`).
pub fn great_circle_path(waypoints: &[LngLat]) -> RoutecastResult<Path> {
    let mut out: Vec<LngLat> = Vec::with_capacity(waypoints.len() * POINTS_PER_LEG);

    for (leg, w) in waypoints.windows(2).enumerate() {
        let (a, b) = (w[0].to_geo(), w[1].to_geo());
        let same = (w[0].lon - w[1].lon).abs() < 1e-12 && (w[0].lat - w[1].lat).abs() < 1e-12;
        let steps = if same { 1 } else { POINTS_PER_LEG - 1 };

        let first = if leg == 0 { 0 } else { 1 };
        for i in first..=steps {
            let p = if i == 0 {
                w[0]
            } else if i == steps {
                w[1]
            } else {
                let ratio = i as f64 / steps as f64;
                LngLat::from_geo(Haversine::point_at_ratio_between(a, b, ratio))
            };
            push_unwrapped(&mut out, p);
        }
    }

    tracing::debug!(
        legs = waypoints.len().saturating_sub(1),
        points = out.len(),
        "built great-circle path"
    );
    Path::new(out)
}

fn push_unwrapped(out: &mut Vec<LngLat>, mut p: LngLat) {
    if let Some(prev) = out.last() {
        while p.lon - prev.lon > 180.0 {
            p.lon -= 360.0;
        }
        while p.lon - prev.lon < -180.0 {
            p.lon += 360.0;
        }
    }
    out.push(p);
}

#[cfg(test)]
#[path = "../../tests/unit/path/great_circle.rs"]
mod tests;
