use glam::{Mat4, Vec3};
use vello_cpu::kurbo::{BezPath, Point};
use vello_cpu::peniko::Color;

use crate::foundation::error::{RoutecastError, RoutecastResult};
use crate::render::FrameRGBA;
use crate::vehicle::kind::VehicleKind;
use crate::vehicle::mesh::{Mesh, vehicle_mesh};

/// One directional light: direction toward the light and its intensity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub intensity: f32,
}

/// Fixed lighting and camera for the vehicle scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleScene {
    pub fov_deg: f32,
    pub eye: Vec3,
    pub ambient: f32,
    pub key: DirectionalLight,
    pub fill: DirectionalLight,
}

impl Default for VehicleScene {
    fn default() -> Self {
        Self {
            fov_deg: 50.0,
            eye: Vec3::new(0.0, 1.5, 3.0),
            ambient: 0.6,
            key: DirectionalLight {
                position: Vec3::new(2.0, 5.0, 3.0),
                intensity: 1.0,
            },
            fill: DirectionalLight {
                position: Vec3::new(-2.0, 3.0, -3.0),
                intensity: 0.3,
            },
        }
    }
}

impl VehicleScene {
    fn view_proj(&self) -> Mat4 {
        Mat4::perspective_rh_gl(self.fov_deg.to_radians(), 1.0, 0.1, 100.0)
            * Mat4::look_at_rh(self.eye, Vec3::ZERO, Vec3::Y)
    }

    /// Lambert shade factor in `[0, 1]`; a face lit head-on by every light keeps its base colour.
    fn shade(&self, normal: Vec3) -> f32 {
        let lit = |l: &DirectionalLight| l.intensity * normal.dot(l.position.normalize()).max(0.0);
        let total = self.ambient + self.key.intensity + self.fill.intensity;
        ((self.ambient + lit(&self.key) + lit(&self.fill)) / total).clamp(0.0, 1.0)
    }
}

/// Offscreen drawable holding the rendered vehicle model.
///
/// Owned and mutated only by its session. After [`VehicleSurface::dispose`] the drawable is gone:
/// [`VehicleSurface::surface`] returns `None` and rotation requests fail.
pub struct VehicleSurface {
    kind: VehicleKind,
    size_px: u32,
    scene: VehicleScene,
    mesh: Mesh,
    rotation_deg: f64,
    frame: Option<FrameRGBA>,
}

impl VehicleSurface {
    /// Build and render `kind` heading north into a `size_px` square.
    pub fn new(kind: VehicleKind, size_px: u32) -> RoutecastResult<Self> {
        Self::with_scene(kind, size_px, VehicleScene::default())
    }

    pub fn with_scene(
        kind: VehicleKind,
        size_px: u32,
        scene: VehicleScene,
    ) -> RoutecastResult<Self> {
        if size_px == 0 || size_px > u32::from(u16::MAX) {
            return Err(RoutecastError::validation(format!(
                "vehicle surface size {size_px} out of range"
            )));
        }
        let mut s = Self {
            kind,
            size_px,
            scene,
            mesh: vehicle_mesh(kind),
            rotation_deg: 0.0,
            frame: None,
        };
        s.frame = Some(s.rasterize());
        tracing::debug!(kind = %kind, size_px, triangles = s.mesh.len(), "vehicle surface created");
        Ok(s)
    }

    pub fn kind(&self) -> VehicleKind {
        self.kind
    }

    pub fn size_px(&self) -> u32 {
        self.size_px
    }

    /// Compass bearing the model was last rendered at.
    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    /// Turn the model to face `bearing_deg` and redraw.
    pub fn set_rotation(&mut self, bearing_deg: f64) -> RoutecastResult<()> {
        if self.is_disposed() {
            return Err(RoutecastError::render("vehicle surface already disposed"));
        }
        self.rotation_deg = bearing_deg;
        self.frame = Some(self.rasterize());
        Ok(())
    }

    /// Current drawable, or `None` once disposed.
    pub fn surface(&self) -> Option<&FrameRGBA> {
        self.frame.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.frame.is_none()
    }

    /// Release the drawable and mesh. Returns `true` only for the call that released them.
    pub fn dispose(&mut self) -> bool {
        if self.frame.take().is_none() {
            return false;
        }
        self.mesh = Mesh::new();
        tracing::debug!(kind = %self.kind, "vehicle surface disposed");
        true
    }

    fn rasterize(&self) -> FrameRGBA {
        // Models face +X at zero yaw while bearings are measured from north.
        let yaw = ((self.rotation_deg - 90.0) as f32).to_radians();
        let model = Mat4::from_rotation_y(yaw);
        let view_proj = self.scene.view_proj();
        let size = self.size_px as f32;

        let mut faces: Vec<(f32, [Point; 3], Color)> = Vec::with_capacity(self.mesh.len());
        for tri in &self.mesh.triangles {
            let world = tri.v.map(|v| model.transform_point3(v));
            let normal = (world[1] - world[0]).cross(world[2] - world[0]);
            let centroid = (world[0] + world[1] + world[2]) / 3.0;
            let to_eye = self.scene.eye - centroid;
            if normal.dot(to_eye) <= 0.0 {
                continue;
            }

            let mut pts = [Point::ZERO; 3];
            let mut visible = true;
            for (p, w) in pts.iter_mut().zip(world) {
                let clip = view_proj * w.extend(1.0);
                if clip.w <= 1e-6 {
                    visible = false;
                    break;
                }
                let ndc = clip.truncate() / clip.w;
                *p = Point::new(
                    f64::from((ndc.x + 1.0) / 2.0 * size),
                    f64::from((1.0 - ndc.y) / 2.0 * size),
                );
            }
            if !visible {
                continue;
            }

            let k = self.scene.shade(normal.normalize());
            let c = tri.color;
            let ch = |v: u8| (f32::from(v) * k).round().clamp(0.0, 255.0) as u8;
            faces.push((
                to_eye.length(),
                pts,
                Color::from_rgba8(ch(c.r), ch(c.g), ch(c.b), 255),
            ));
        }
        // Painter's order: farthest first.
        faces.sort_by(|a, b| b.0.total_cmp(&a.0));

        let edge = self.size_px as u16;
        let mut ctx = vello_cpu::RenderContext::new(edge, edge);
        for (_, pts, color) in &faces {
            let mut path = BezPath::new();
            path.move_to(pts[0]);
            path.line_to(pts[1]);
            path.line_to(pts[2]);
            path.close_path();
            ctx.set_paint(*color);
            ctx.fill_path(&path);
        }
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(edge, edge);
        ctx.render_to_pixmap(&mut pixmap);
        FrameRGBA::from_pixmap(&pixmap)
    }
}

impl Drop for VehicleSurface {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/vehicle/surface.rs"]
mod tests;
