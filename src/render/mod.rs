//! Pixel buffers and premultiplied blending shared by every drawable.

pub mod blend;
pub mod frame;

pub use blend::{PremulRgba8, blit_over, over};
pub use frame::FrameRGBA;
