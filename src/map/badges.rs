use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::core::Rgb8;
use crate::foundation::error::{RoutecastError, RoutecastResult};
use crate::render::FrameRGBA;

/// Numbered stop badge rasterized from SVG.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BadgeStyle {
    pub diameter: u32,
    pub border_width: f32,
    pub border: Rgb8,
    pub font_size: f32,
}

impl Default for BadgeStyle {
    fn default() -> Self {
        Self {
            diameter: 28,
            border_width: 3.0,
            border: Rgb8::from_hex(0x4285F4),
            font_size: 11.0,
        }
    }
}

/// Caches one rasterized badge per stop number.
pub struct BadgeCache {
    style: BadgeStyle,
    opts: usvg::Options<'static>,
    rendered: HashMap<usize, Arc<FrameRGBA>>,
}

impl BadgeCache {
    pub fn new(style: BadgeStyle) -> Self {
        let mut opts = usvg::Options::default();
        opts.fontdb_mut().load_system_fonts();
        Self {
            style,
            opts,
            rendered: HashMap::new(),
        }
    }

    /// Badge for the 1-based stop `number`.
    pub fn badge(&mut self, number: usize) -> RoutecastResult<Arc<FrameRGBA>> {
        if let Some(b) = self.rendered.get(&number) {
            return Ok(b.clone());
        }
        let svg = badge_svg(&self.style, number);
        let tree = usvg::Tree::from_data(svg.as_bytes(), &self.opts).context("parse badge svg")?;
        let frame = Arc::new(rasterize(&tree, self.style.diameter)?);
        self.rendered.insert(number, frame.clone());
        Ok(frame)
    }
}

fn badge_svg(style: &BadgeStyle, number: usize) -> String {
    let d = style.diameter as f32;
    let r = (d - style.border_width) / 2.0;
    let c = d / 2.0;
    let color = style.border.to_css();
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{d}" height="{d}" viewBox="0 0 {d} {d}"><circle cx="{c}" cy="{c}" r="{r}" fill="#ffffff" stroke="{color}" stroke-width="{bw}"/><text x="{c}" y="{c}" dy="0.35em" text-anchor="middle" font-family="sans-serif" font-weight="700" font-size="{fs}" fill="{color}">{number}</text></svg>"##,
        bw = style.border_width,
        fs = style.font_size,
    )
}

fn rasterize(tree: &usvg::Tree, size: u32) -> RoutecastResult<FrameRGBA> {
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size, size)
        .ok_or_else(|| RoutecastError::render("failed to allocate badge pixmap"))?;
    let sx = size as f32 / tree.size().width();
    let sy = size as f32 / tree.size().height();
    resvg::render(
        tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );
    FrameRGBA::from_raw(size, size, pixmap.data().to_vec(), true)
}

#[cfg(test)]
#[path = "../../tests/unit/map/badges.rs"]
mod tests;
