use std::sync::Arc;

use vello_cpu::kurbo::{BezPath, Cap, Join, Rect, Stroke};
use vello_cpu::peniko::Color;

use crate::foundation::core::{Canvas, LngLat, Point, Rgb8};
use crate::foundation::error::RoutecastResult;
use crate::map::badges::{BadgeCache, BadgeStyle};
use crate::map::view::MapView;
use crate::path::geometry::Path;
use crate::render::{FrameRGBA, blit_over};

/// One stroked line layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineStyle {
    pub color: Rgb8,
    pub width: f64,
    pub opacity: f32,
    /// Dash and gap lengths in multiples of `width`.
    pub dash: Option<(f64, f64)>,
}

impl LineStyle {
    fn paint(&self) -> Color {
        let a = (self.opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        Color::from_rgba8(self.color.r, self.color.g, self.color.b, a)
    }
}

/// Colours and line styles of the base map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapStyle {
    pub background: Rgb8,
    pub graticule: Rgb8,
    pub route: LineStyle,
    pub trail: LineStyle,
    pub dash: LineStyle,
    pub badge: BadgeStyle,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            background: Rgb8::from_hex(0xF2F1ED),
            graticule: Rgb8::from_hex(0xDCDCD8),
            route: LineStyle {
                color: Rgb8::from_hex(0x5F6368),
                width: 6.0,
                opacity: 0.4,
                dash: None,
            },
            trail: LineStyle {
                color: Rgb8::from_hex(0x4285F4),
                width: 4.0,
                opacity: 1.0,
                dash: None,
            },
            dash: LineStyle {
                color: Rgb8::from_hex(0x1A73E8),
                width: 1.5,
                opacity: 0.6,
                dash: Some((2.0, 3.0)),
            },
            badge: BadgeStyle::default(),
        }
    }
}

/// Data sources drawn on top of the base map.
#[derive(Clone, Debug, Default)]
pub struct RouteLayers {
    pub route: Option<Arc<Path>>,
    pub trail: Vec<LngLat>,
    pub stops: Vec<LngLat>,
}

/// The base drawable: background, graticule, route layers and stop badges.
pub struct MapSurface {
    canvas: Canvas,
    style: MapStyle,
    pixmap: vello_cpu::Pixmap,
    badges: BadgeCache,
    frame: FrameRGBA,
}

impl MapSurface {
    /// Allocate the pixmap and frame for `canvas`.
    pub fn new(canvas: Canvas, style: MapStyle) -> RoutecastResult<Self> {
        canvas.validate()?;
        let (w, h) = (canvas.width as u16, canvas.height as u16);
        Ok(Self {
            canvas,
            style,
            pixmap: vello_cpu::Pixmap::new(w, h),
            badges: BadgeCache::new(style.badge),
            frame: FrameRGBA::new_transparent(canvas.width, canvas.height)?,
        })
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Last rendered frame.
    pub fn frame(&self) -> &FrameRGBA {
        &self.frame
    }

    /// Redraw the whole surface for `view`.
    pub fn render(&mut self, view: &MapView, layers: &RouteLayers) -> RoutecastResult<&FrameRGBA> {
        let w = f64::from(self.canvas.width);
        let h = f64::from(self.canvas.height);
        let style = self.style;

        let mut ctx =
            vello_cpu::RenderContext::new(self.canvas.width as u16, self.canvas.height as u16);
        let bg = style.background;
        ctx.set_paint(Color::from_rgba8(bg.r, bg.g, bg.b, 255));
        ctx.fill_rect(&Rect::new(0.0, 0.0, w, h));

        draw_graticule(&mut ctx, view, style.graticule);

        if let Some(route) = &layers.route {
            stroke_polyline(&mut ctx, view, route.coords(), &style.route);
        }
        if layers.trail.len() >= 2 {
            stroke_polyline(&mut ctx, view, &layers.trail, &style.trail);
        }
        if let Some(route) = &layers.route {
            stroke_polyline(&mut ctx, view, route.coords(), &style.dash);
        }

        ctx.flush();
        ctx.render_to_pixmap(&mut self.pixmap);
        self.frame.data.copy_from_slice(self.pixmap.data_as_u8_slice());
        // The background covers every pixel; u8 coverage rounding can leave stroke edges at 254.
        for px in self.frame.data.chunks_exact_mut(4) {
            px[3] = 255;
        }

        for (i, stop) in layers.stops.iter().enumerate() {
            let Some(p) = view.project(*stop) else {
                continue;
            };
            let badge = self.badges.badge(i + 1)?;
            let x = (p.x - f64::from(badge.width) / 2.0).round() as i64;
            let y = (p.y - f64::from(badge.height) / 2.0).round() as i64;
            blit_over(&mut self.frame, &badge, x, y);
        }
        Ok(&self.frame)
    }
}

fn draw_graticule(ctx: &mut vello_cpu::RenderContext, view: &MapView, color: Rgb8) {
    let step = graticule_step(view.pose().zoom);
    let line = LineStyle {
        color,
        width: 1.0,
        opacity: 1.0,
        dash: None,
    };
    let center = view.pose().center;
    let span = step * 12.0;
    let lon0 = ((center.lon - span) / step).floor() * step;
    let lat0 = ((center.lat - span).max(-85.0) / step).floor() * step;

    let mut lon = lon0;
    while lon <= center.lon + span {
        let pts: Vec<LngLat> = (0..=32)
            .map(|i| LngLat::new(lon, -85.0 + 170.0 * f64::from(i) / 32.0))
            .collect();
        stroke_polyline(ctx, view, &pts, &line);
        lon += step;
    }
    let mut lat = lat0;
    while lat <= (center.lat + span).min(85.0) {
        let pts: Vec<LngLat> = (0..=32)
            .map(|i| LngLat::new(lon0 + 2.0 * span * f64::from(i) / 32.0, lat))
            .collect();
        stroke_polyline(ctx, view, &pts, &line);
        lat += step;
    }
}

/// Graticule spacing in degrees for a zoom level.
fn graticule_step(zoom: f64) -> f64 {
    match zoom {
        z if z < 3.0 => 30.0,
        z if z < 5.0 => 10.0,
        z if z < 7.0 => 5.0,
        z if z < 9.0 => 1.0,
        _ => 0.5,
    }
}

/// Split a coordinate run into projected screen runs, breaking wherever a point does not project.
pub(crate) fn project_runs(view: &MapView, coords: &[LngLat]) -> Vec<Vec<Point>> {
    let mut runs = Vec::new();
    let mut cur: Vec<Point> = Vec::new();
    for c in coords {
        match view.project(*c) {
            Some(p) => cur.push(p),
            None => {
                if cur.len() >= 2 {
                    runs.push(std::mem::take(&mut cur));
                } else {
                    cur.clear();
                }
            }
        }
    }
    if cur.len() >= 2 {
        runs.push(cur);
    }
    runs
}

/// Cut a screen-space polyline into dash pieces of `on` length separated by `off`.
pub(crate) fn dash_run(run: &[Point], on: f64, off: f64) -> Vec<Vec<Point>> {
    const EPS: f64 = 1e-9;
    let mut dashes = Vec::new();
    if on <= 0.0 || run.len() < 2 {
        return dashes;
    }
    let period = on + off.max(0.0);
    let mut phase = 0.0;
    let mut cur: Vec<Point> = Vec::new();

    for w in run.windows(2) {
        let (a, b) = (w[0], w[1]);
        let seg = a.distance(b);
        let mut t = 0.0;
        while seg - t > EPS {
            let in_dash = phase < on;
            let remaining = if in_dash { on - phase } else { period - phase };
            let step = remaining.min(seg - t);
            if in_dash {
                if cur.is_empty() {
                    cur.push(a.lerp(b, t / seg));
                }
                cur.push(a.lerp(b, (t + step) / seg));
            }
            t += step;
            phase += step;
            if in_dash && phase >= on - EPS {
                if cur.len() >= 2 {
                    dashes.push(std::mem::take(&mut cur));
                }
                cur.clear();
            }
            if phase >= period - EPS {
                phase = 0.0;
            }
        }
    }
    if cur.len() >= 2 {
        dashes.push(cur);
    }
    dashes
}

fn to_bez(run: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    for (i, p) in run.iter().enumerate() {
        let p = vello_cpu::kurbo::Point::new(p.x, p.y);
        if i == 0 {
            path.move_to(p);
        } else {
            path.line_to(p);
        }
    }
    path
}

fn stroke_polyline(
    ctx: &mut vello_cpu::RenderContext,
    view: &MapView,
    coords: &[LngLat],
    style: &LineStyle,
) {
    let runs = project_runs(view, coords);
    if runs.is_empty() {
        return;
    }
    ctx.set_paint(style.paint());
    ctx.set_stroke(
        Stroke::new(style.width)
            .with_caps(Cap::Round)
            .with_join(Join::Round),
    );
    for run in &runs {
        match style.dash {
            Some((on, off)) => {
                for piece in dash_run(run, on * style.width, off * style.width) {
                    ctx.stroke_path(&to_bez(&piece));
                }
            }
            None => ctx.stroke_path(&to_bez(run)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/map/surface.rs"]
mod tests;
