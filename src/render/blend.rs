use crate::foundation::math::mul_div255_u8;
use crate::render::frame::FrameRGBA;

pub type PremulRgba8 = [u8; 4];

/// Source-over for premultiplied pixels with an extra opacity multiplier.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255_u8(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = sa.saturating_add(mul_div255_u8(u16::from(dst[3]), inv));
    for i in 0..3 {
        let sc = mul_div255_u8(u16::from(src[i]), op);
        let dc = mul_div255_u8(u16::from(dst[i]), inv);
        out[i] = sc.saturating_add(dc);
    }
    out
}

/// Draw `src` onto `dst` with its top-left corner at `(x, y)`, clipping to `dst`.
///
/// Returns the number of destination pixels touched.
pub fn blit_over(dst: &mut FrameRGBA, src: &FrameRGBA, x: i64, y: i64) -> usize {
    let dw = i64::from(dst.width);
    let dh = i64::from(dst.height);
    let sw = i64::from(src.width);
    let sh = i64::from(src.height);

    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + sw).min(dw);
    let y1 = (y + sh).min(dh);
    if x0 >= x1 || y0 >= y1 {
        return 0;
    }

    let mut touched = 0;
    for dy in y0..y1 {
        let sy = dy - y;
        for dx in x0..x1 {
            let sx = dx - x;
            let si = ((sy * sw + sx) * 4) as usize;
            let di = ((dy * dw + dx) * 4) as usize;
            let s = [src.data[si], src.data[si + 1], src.data[si + 2], src.data[si + 3]];
            let d = [dst.data[di], dst.data[di + 1], dst.data[di + 2], dst.data[di + 3]];
            dst.data[di..di + 4].copy_from_slice(&over(d, s, 1.0));
            touched += 1;
        }
    }
    touched
}

#[cfg(test)]
#[path = "../../tests/unit/render/blend.rs"]
mod tests;
