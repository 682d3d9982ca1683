use geo::{Bearing, Distance, Haversine};

use crate::foundation::core::{LngLat, LngLatBounds};
use crate::foundation::error::{RoutecastError, RoutecastResult};
use crate::foundation::math::normalize_signed_degrees;

/// Great-circle distance in kilometres.
pub fn haversine_km(a: LngLat, b: LngLat) -> f64 {
    Haversine::distance(a.to_geo(), b.to_geo()) / 1000.0
}

/// Initial compass bearing from `from` toward `to`, in degrees within `(-180, 180]`.
pub fn initial_bearing(from: LngLat, to: LngLat) -> f64 {
    normalize_signed_degrees(Haversine::bearing(from.to_geo(), to.to_geo()))
}

/// Immutable travel path: an ordered polyline plus its arc-length table.
///
/// Sampling is parameterized by distance along the line, not by vertex index, so unevenly spaced
/// vertices still produce constant-speed motion.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    coords: Vec<LngLat>,
    // cumulative_km[i] = distance from coords[0] to coords[i]
    cumulative_km: Vec<f64>,
}

impl Path {
    /// Build a path from at least two valid coordinates.
    pub fn new(coords: Vec<LngLat>) -> RoutecastResult<Self> {
        if coords.len() < 2 {
            return Err(RoutecastError::validation(
                "path requires at least two coordinates",
            ));
        }
        if let Some(bad) = coords.iter().find(|c| !c.lon.is_finite() || !c.lat.is_finite()) {
            return Err(RoutecastError::validation(format!(
                "path coordinate is not finite: {bad:?}"
            )));
        }

        let mut cumulative_km = Vec::with_capacity(coords.len());
        let mut acc = 0.0;
        cumulative_km.push(0.0);
        for w in coords.windows(2) {
            acc += haversine_km(w[0], w[1]);
            cumulative_km.push(acc);
        }

        Ok(Self {
            coords,
            cumulative_km,
        })
    }

    /// Path vertices in travel order.
    pub fn coords(&self) -> &[LngLat] {
        &self.coords
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.coords.len()
    }

    /// Total length in kilometres.
    pub fn length_km(&self) -> f64 {
        self.cumulative_km.last().copied().unwrap_or(0.0)
    }

    /// First vertex.
    pub fn start(&self) -> LngLat {
        self.coords[0]
    }

    /// Last vertex.
    pub fn end(&self) -> LngLat {
        self.coords[self.coords.len() - 1]
    }

    /// Point `distance_km` along the path, interpolated linearly inside the containing segment.
    ///
    /// Distances at or below zero return the first vertex exactly; distances at or beyond the
    /// total length return the last vertex exactly.
    pub fn point_at_distance(&self, distance_km: f64) -> LngLat {
        let total = self.length_km();
        if distance_km.is_nan() || distance_km <= 0.0 {
            return self.start();
        }
        if distance_km >= total {
            return self.end();
        }

        let idx = self.cumulative_km.partition_point(|&c| c <= distance_km);
        // idx >= 1 because cumulative_km[0] == 0 < distance_km, and idx < len because
        // distance_km < total.
        let i = idx - 1;
        let seg_start = self.cumulative_km[i];
        let seg_len = self.cumulative_km[idx] - seg_start;
        let t = if seg_len > 0.0 {
            (distance_km - seg_start) / seg_len
        } else {
            0.0
        };
        self.coords[i].lerp(self.coords[idx], t)
    }

    /// Point at `fraction` of the total length.
    pub fn point_at_fraction(&self, fraction: f64) -> LngLat {
        if fraction >= 1.0 {
            return self.end();
        }
        self.point_at_distance(self.length_km() * fraction)
    }

    /// The first `count` vertices (clamped to the vertex count).
    pub fn prefix(&self, count: usize) -> &[LngLat] {
        &self.coords[..count.min(self.coords.len())]
    }

    /// Geographic extent of every vertex.
    pub fn bounds(&self) -> LngLatBounds {
        LngLatBounds {
            min: self.coords.iter().fold(self.coords[0], |m, c| {
                LngLat::new(m.lon.min(c.lon), m.lat.min(c.lat))
            }),
            max: self.coords.iter().fold(self.coords[0], |m, c| {
                LngLat::new(m.lon.max(c.lon), m.lat.max(c.lat))
            }),
        }
    }

    /// GeoJSON `Feature<LineString>` representation.
    pub fn to_geojson(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "Feature",
            "properties": { "length_km": self.length_km() },
            "geometry": {
                "type": "LineString",
                "coordinates": self.coords,
            },
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/path/geometry.rs"]
mod tests;
