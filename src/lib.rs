//! Routecast turns an ordered list of stops into an animated travel-route video.
//!
//! A resolved [`Path`] is walked by a time-driven sampler; each sampled position moves the
//! map camera, extends the drawn trail and turns a small 3D vehicle. A compositor merges the
//! map and vehicle drawables every frame, and the capture controller records the merged
//! surface into a downloadable video.
//!
//! - Resolve stops with a [`Geocoder`] and a [`PathSource`]
//! - Create an [`AnimationSession`] and hand it the path
//! - Drive it with a [`Player`] to play or export
#![forbid(unsafe_code)]

pub mod capture;
pub mod composite;
pub mod config;
pub mod foundation;
pub mod map;
pub mod path;
pub mod render;
pub mod schedule;
pub mod services;
pub mod session;
pub mod stops;
pub mod vehicle;

pub use crate::foundation::core::{Canvas, Fps, LngLat, LngLatBounds, Point, Rgb8};
pub use crate::foundation::error::{RoutecastError, RoutecastResult};

pub use crate::capture::{
    CaptureController, ContainerFormat, DefaultEncoderFactory, InProcessEncoderFactory,
    VideoAsset,
};
pub use crate::config::{AnimationOpts, TripConfig};
pub use crate::path::geometry::Path;
pub use crate::path::sampler::{PathSampler, SampledPosition, sample};
pub use crate::render::FrameRGBA;
pub use crate::services::{
    GeocodeCandidate, Geocoder, GreatCircleSource, NominatimGeocoder, OsrmPathSource, PathSource,
};
pub use crate::session::{
    AnimationSession, AnimationState, ExportTarget, Player, PlayerOutcome, SessionEvent,
};
pub use crate::stops::{Stop, StopId, StopList};
pub use crate::vehicle::VehicleKind;
