use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};

use crate::capture::controller::VideoAsset;
use crate::foundation::error::RoutecastResult;

pub const DEFAULT_FILE_PREFIX: &str = "travel-animation";

/// `<prefix>-<unix millis>.<extension>`
pub fn download_file_name(prefix: &str, extension: &str, at: DateTime<Utc>) -> String {
    format!("{prefix}-{}.{extension}", at.timestamp_millis())
}

/// Write `asset` into `dir` under a timestamped name and return the final path.
///
/// Bytes go to a temporary file in `dir` first; it is renamed into place only once fully
/// written, and removed if anything fails.
pub fn deliver_download(asset: &VideoAsset, dir: &Path, prefix: &str) -> RoutecastResult<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create output directory '{}'", dir.display()))?;
    let name = download_file_name(prefix, asset.extension(), Utc::now());
    let target = dir.join(name);

    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in '{}'", dir.display()))?;
    tmp.write_all(&asset.bytes)
        .context("write video bytes to temp file")?;
    tmp.flush().context("flush temp file")?;
    tmp.persist(&target)
        .map_err(|e| anyhow::Error::from(e.error))
        .with_context(|| format!("persist video to '{}'", target.display()))?;

    tracing::info!(path = %target.display(), bytes = asset.bytes.len(), "video delivered");
    Ok(target)
}

#[cfg(test)]
#[path = "../../tests/unit/capture/download.rs"]
mod tests;
