//! Recording the composed surface into a downloadable video asset.

pub mod controller;
pub mod download;
pub mod encoder;
pub mod ffmpeg;
pub mod format;
pub mod stream;
pub mod y4m;

pub use controller::{CaptureConfig, CaptureController, CaptureState, VideoAsset};
pub use download::{DEFAULT_FILE_PREFIX, deliver_download, download_file_name};
pub use encoder::{
    ChunkEncoder, DefaultEncoderFactory, EncoderConfig, EncoderFactory, InProcessEncoderFactory,
};
pub use format::{ContainerFormat, FORMAT_PREFERENCE, select_format};
pub use stream::CaptureStream;
pub use y4m::Y4mEncoder;
