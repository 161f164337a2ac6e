use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::MediaError;

/// Suffix appended to the source path for the remuxed output.
pub const PROCESSING_SUFFIX: &str = ".processing";

/// Rewrites a container so its index precedes the sample data.
#[async_trait::async_trait]
pub trait Remuxer: Send + Sync {
    /// Returns the path of the new file. The caller owns both files afterwards.
    async fn fast_start(&self, source: &Path) -> Result<PathBuf, MediaError>;
}

/// `Remuxer` backed by the `ffmpeg` binary.
#[derive(Debug, Clone)]
pub struct FfmpegRemuxer {
    ffmpeg_path: PathBuf,
}

impl FfmpegRemuxer {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }
}

/// `<source>.processing`, next to the source.
pub fn output_path_for(source: &Path) -> PathBuf {
    let mut name = OsString::from(source.as_os_str());
    name.push(PROCESSING_SUFFIX);
    PathBuf::from(name)
}

#[async_trait::async_trait]
impl Remuxer for FfmpegRemuxer {
    async fn fast_start(&self, source: &Path) -> Result<PathBuf, MediaError> {
        let output_path = output_path_for(source);
        debug!(
            source = %source.display(),
            output = %output_path.display(),
            "remuxing for fast start"
        );

        let output = tokio::process::Command::new(&self.ffmpeg_path)
            .arg("-i")
            .arg(source)
            .args(["-c", "copy", "-movflags", "faststart", "-f", "mp4"])
            .arg(&output_path)
            .stdin(std::process::Stdio::null())
            .output()
            .await
            .map_err(|e| MediaError::Remux(format!("spawn failed: {e}")))?;

        if !output.status.success() {
            // ffmpeg may leave a partial file behind
            let _ = tokio::fs::remove_file(&output_path).await;
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(source = %source.display(), status = %output.status, "ffmpeg exited with failure");
            return Err(MediaError::Remux(stderr.trim().to_string()));
        }

        let meta = tokio::fs::metadata(&output_path).await.map_err(|e| {
            MediaError::Remux(format!("could not stat {}: {e}", output_path.display()))
        })?;
        if meta.len() == 0 {
            let _ = tokio::fs::remove_file(&output_path).await;
            return Err(MediaError::Remux("processed file is empty".into()));
        }

        Ok(output_path)
    }
}
