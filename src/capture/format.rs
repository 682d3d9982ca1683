use std::fmt;

/// Container and codec pairs a recording can be encoded as.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContainerFormat {
    WebmVp9,
    WebmVp8,
    Mp4H264,
    /// Uncompressed YUV4MPEG2 (4:4:4), encoded in-process.
    Y4m,
}

/// Formats tried in order when a recording starts.
pub const FORMAT_PREFERENCE: [ContainerFormat; 4] = [
    ContainerFormat::WebmVp9,
    ContainerFormat::WebmVp8,
    ContainerFormat::Mp4H264,
    ContainerFormat::Y4m,
];

impl ContainerFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::WebmVp9 => "video/webm;codecs=vp9",
            Self::WebmVp8 => "video/webm;codecs=vp8",
            Self::Mp4H264 => "video/mp4;codecs=avc1",
            Self::Y4m => "video/x-yuv4mpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::WebmVp9 | Self::WebmVp8 => "webm",
            Self::Mp4H264 => "mp4",
            Self::Y4m => "y4m",
        }
    }

    /// ffmpeg encoder name, or `None` for formats encoded in-process.
    pub fn ffmpeg_encoder(self) -> Option<&'static str> {
        match self {
            Self::WebmVp9 => Some("libvpx-vp9"),
            Self::WebmVp8 => Some("libvpx"),
            Self::Mp4H264 => Some("libx264"),
            Self::Y4m => None,
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// First format in [`FORMAT_PREFERENCE`] accepted by `supported`; Y4M when none is.
pub fn select_format(supported: impl Fn(ContainerFormat) -> bool) -> ContainerFormat {
    FORMAT_PREFERENCE
        .into_iter()
        .find(|f| supported(*f))
        .unwrap_or(ContainerFormat::Y4m)
}

#[cfg(test)]
#[path = "../../tests/unit/capture/format.rs"]
mod tests;
