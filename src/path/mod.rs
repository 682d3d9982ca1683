//! Path geometry, duration policy and time-driven sampling.

pub mod clock;
pub mod geometry;
pub mod great_circle;
pub mod sampler;
