//! Vehicle meshes assembled from box, cylinder and capsule primitives.
//!
//! Primitive dimensions follow the usual scene-graph conventions: boxes are centred on the
//! origin, cylinders and capsules stand along +Y. Every triangle is wound so its geometric
//! normal points out of the primitive it belongs to.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Mat4, Vec3};

use crate::foundation::core::Rgb8;
use crate::vehicle::kind::{VehicleKind, WHEEL_COLOR};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub v: [Vec3; 3],
    pub color: Rgb8,
}

impl Triangle {
    /// Unnormalized geometric normal.
    pub fn normal(&self) -> Vec3 {
        (self.v[1] - self.v[0]).cross(self.v[2] - self.v[0])
    }

    pub fn centroid(&self) -> Vec3 {
        (self.v[0] + self.v[1] + self.v[2]) / 3.0
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Add triangles in local space, placed by `transform`, oriented away from `local_center`.
    fn push_part(&mut self, tris: &[[Vec3; 3]], local_center: Vec3, transform: Mat4, color: Rgb8) {
        let center = transform.transform_point3(local_center);
        for t in tris {
            let mut tri = Triangle {
                v: t.map(|p| transform.transform_point3(p)),
                color,
            };
            let n = tri.normal();
            if n.length_squared() <= f32::EPSILON * f32::EPSILON {
                continue;
            }
            if n.dot(tri.centroid() - center) < 0.0 {
                tri.v.swap(1, 2);
            }
            self.triangles.push(tri);
        }
    }

    /// Axis-aligned box of `size` (width, height, depth) centred on the origin.
    pub fn push_box(&mut self, size: Vec3, transform: Mat4, color: Rgb8) {
        let h = size / 2.0;
        let c = |x: f32, y: f32, z: f32| Vec3::new(x * h.x, y * h.y, z * h.z);
        let corners = [
            c(-1.0, -1.0, -1.0),
            c(1.0, -1.0, -1.0),
            c(1.0, 1.0, -1.0),
            c(-1.0, 1.0, -1.0),
            c(-1.0, -1.0, 1.0),
            c(1.0, -1.0, 1.0),
            c(1.0, 1.0, 1.0),
            c(-1.0, 1.0, 1.0),
        ];
        const FACES: [[usize; 4]; 6] = [
            [0, 1, 2, 3],
            [4, 5, 6, 7],
            [0, 1, 5, 4],
            [3, 2, 6, 7],
            [0, 3, 7, 4],
            [1, 2, 6, 5],
        ];
        let mut tris = Vec::with_capacity(12);
        for f in FACES {
            tris.push([corners[f[0]], corners[f[1]], corners[f[2]]]);
            tris.push([corners[f[0]], corners[f[2]], corners[f[3]]]);
        }
        self.push_part(&tris, Vec3::ZERO, transform, color);
    }

    /// Surface of revolution around +Y through `profile` points `(radius, y)`.
    pub fn push_lathe(
        &mut self,
        profile: &[(f32, f32)],
        segments: u32,
        transform: Mat4,
        color: Rgb8,
    ) {
        let segments = segments.max(3);
        let ring = |i: u32, (r, y): (f32, f32)| {
            let a = TAU * i as f32 / segments as f32;
            Vec3::new(r * a.sin(), y, r * a.cos())
        };
        let mut tris = Vec::new();
        for w in profile.windows(2) {
            for i in 0..segments {
                let p00 = ring(i, w[0]);
                let p01 = ring(i + 1, w[0]);
                let p10 = ring(i, w[1]);
                let p11 = ring(i + 1, w[1]);
                tris.push([p00, p01, p11]);
                tris.push([p00, p11, p10]);
            }
        }
        let (lo, hi) = profile
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), p| (lo.min(p.1), hi.max(p.1)));
        let center = Vec3::new(0.0, (lo + hi) / 2.0, 0.0);
        self.push_part(&tris, center, transform, color);
    }

    /// Closed cylinder (or truncated cone) standing on +Y.
    pub fn push_cylinder(
        &mut self,
        radius_top: f32,
        radius_bottom: f32,
        height: f32,
        segments: u32,
        transform: Mat4,
        color: Rgb8,
    ) {
        let h = height / 2.0;
        let profile = [(0.0, -h), (radius_bottom, -h), (radius_top, h), (0.0, h)];
        self.push_lathe(&profile, segments, transform, color);
    }

    /// Capsule of `radius` whose straight section is `length` long, standing on +Y.
    pub fn push_capsule(
        &mut self,
        radius: f32,
        length: f32,
        cap_segments: u32,
        segments: u32,
        transform: Mat4,
        color: Rgb8,
    ) {
        let h = length / 2.0;
        let cap_segments = cap_segments.max(1);
        let mut profile = Vec::with_capacity(2 * cap_segments as usize + 2);
        for i in 0..=cap_segments {
            let a = -FRAC_PI_2 + FRAC_PI_2 * i as f32 / cap_segments as f32;
            profile.push((radius * a.cos(), -h + radius * a.sin()));
        }
        for i in 0..=cap_segments {
            let a = FRAC_PI_2 * i as f32 / cap_segments as f32;
            profile.push((radius * a.cos(), h + radius * a.sin()));
        }
        self.push_lathe(&profile, segments, transform, color);
    }
}

fn at(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

/// Build the model for `kind`, centred near the origin and facing +X at zero yaw.
pub fn vehicle_mesh(kind: VehicleKind) -> Mesh {
    let pal = kind.palette();
    let mut m = Mesh::new();
    let rx = |a: f32| Mat4::from_rotation_x(a);
    let quarter = FRAC_PI_2;

    match kind {
        VehicleKind::Plane => {
            m.push_capsule(0.15, 0.8, 4, 8, rx(quarter), pal.primary);
            m.push_box(Vec3::new(1.2, 0.05, 0.3), at(0.0, 0.0, 0.1) * rx(quarter), pal.secondary);
            m.push_box(Vec3::new(0.4, 0.05, 0.25), at(0.0, -0.35, 0.05) * rx(quarter), pal.secondary);
            m.push_box(Vec3::new(0.05, 0.3, 0.2), at(0.0, -0.35, 0.0) * rx(0.3), pal.secondary);
            for x in [-0.35, 0.35] {
                m.push_cylinder(0.08, 0.08, 0.25, 8, at(x, 0.0, 0.1) * rx(quarter), pal.accent);
            }
        }
        VehicleKind::Car => {
            m.push_box(Vec3::new(0.5, 0.2, 0.9), at(0.0, 0.15, 0.0), pal.primary);
            m.push_box(Vec3::new(0.4, 0.18, 0.4), at(0.0, 0.34, -0.05), pal.secondary);
            for (x, z) in [(-0.22, 0.3), (0.22, 0.3), (-0.22, -0.3), (0.22, -0.3)] {
                let t = at(x, 0.1, z) * Mat4::from_rotation_z(quarter);
                m.push_cylinder(0.1, 0.1, 0.08, 16, t, WHEEL_COLOR);
            }
        }
        VehicleKind::Train => {
            m.push_box(Vec3::new(0.5, 0.4, 1.2), at(0.0, 0.3, 0.0), pal.primary);
            for (x, z) in [(-0.25, -0.35), (0.25, -0.35), (-0.25, 0.35), (0.25, 0.35)] {
                let t = at(x, 0.12, z) * Mat4::from_rotation_z(quarter);
                m.push_cylinder(0.12, 0.12, 0.06, 16, t, WHEEL_COLOR);
            }
        }
        VehicleKind::Ship => {
            m.push_box(Vec3::new(0.6, 0.25, 1.0), rx(quarter), pal.primary);
            m.push_box(Vec3::new(0.3, 0.2, 0.3), at(0.0, 0.2, -0.05) * rx(quarter), pal.secondary);
            m.push_cylinder(0.04, 0.06, 0.15, 8, at(0.0, 0.35, -0.15) * rx(quarter), pal.accent);
        }
    }
    m
}

#[cfg(test)]
#[path = "../../tests/unit/vehicle/mesh.rs"]
mod tests;
