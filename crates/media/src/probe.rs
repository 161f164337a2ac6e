use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::MediaError;

/// Width and height of the first video stream in a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDimensions {
    pub width: u32,
    pub height: u32,
}

/// Reads stream dimensions from a local media file.
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, file: &Path) -> Result<StreamDimensions, MediaError>;
}

/// `Prober` backed by the `ffprobe` binary.
#[derive(Debug, Clone)]
pub struct FfprobeProber {
    ffprobe_path: PathBuf,
}

impl FfprobeProber {
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }
}

#[async_trait::async_trait]
impl Prober for FfprobeProber {
    async fn probe(&self, file: &Path) -> Result<StreamDimensions, MediaError> {
        debug!(file = %file.display(), "running ffprobe");
        let output = tokio::process::Command::new(&self.ffprobe_path)
            .args(["-v", "error", "-print_format", "json", "-show_streams"])
            .arg(file)
            .output()
            .await
            .map_err(|e| MediaError::Probe(format!("spawn failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(file = %file.display(), status = %output.status, "ffprobe exited with failure");
            return Err(MediaError::Probe(stderr.trim().to_string()));
        }

        parse_probe_output(&output.stdout)
    }
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeStream {
    #[serde(default)]
    codec_type: String,
    width: Option<u32>,
    height: Option<u32>,
}

fn parse_probe_output(stdout: &[u8]) -> Result<StreamDimensions, MediaError> {
    let parsed: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| MediaError::Probe(format!("parse JSON: {e}")))?;

    if parsed.streams.is_empty() {
        return Err(MediaError::Probe("no streams in output".into()));
    }

    let video = parsed
        .streams
        .iter()
        .find(|s| s.codec_type == "video")
        .ok_or_else(|| MediaError::Probe("no video stream".into()))?;

    match (video.width, video.height) {
        (Some(width), Some(height)) => Ok(StreamDimensions { width, height }),
        _ => Err(MediaError::Probe("video stream has no dimensions".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_video_stream() {
        let json = serde_json::json!({
            "streams": [
                { "index": 0, "codec_type": "audio", "codec_name": "aac", "channels": 2 },
                { "index": 1, "codec_type": "video", "codec_name": "h264", "width": 1280, "height": 720 },
                { "index": 2, "codec_type": "video", "codec_name": "mjpeg", "width": 320, "height": 320 }
            ]
        });
        let dims = parse_probe_output(json.to_string().as_bytes()).unwrap();
        assert_eq!(
            dims,
            StreamDimensions {
                width: 1280,
                height: 720
            }
        );
    }

    #[test]
    fn empty_streams_fail() {
        let err = parse_probe_output(br#"{"streams": []}"#).unwrap_err();
        assert!(matches!(err, MediaError::Probe(m) if m.contains("no streams")));

        let err = parse_probe_output(b"{}").unwrap_err();
        assert!(matches!(err, MediaError::Probe(_)));
    }

    #[test]
    fn audio_only_fails() {
        let json = br#"{"streams": [{"codec_type": "audio", "codec_name": "mp3"}]}"#;
        let err = parse_probe_output(json).unwrap_err();
        assert!(matches!(err, MediaError::Probe(m) if m.contains("no video stream")));
    }

    #[test]
    fn garbage_output_fails() {
        let err = parse_probe_output(b"Invalid data found when processing input").unwrap_err();
        assert!(matches!(err, MediaError::Probe(m) if m.starts_with("parse JSON")));
    }

    #[tokio::test]
    async fn missing_binary_is_a_probe_error() {
        let prober = FfprobeProber::new("/nonexistent/ffprobe-binary");
        let err = prober.probe(Path::new("whatever.mp4")).await.unwrap_err();
        assert!(matches!(err, MediaError::Probe(m) if m.starts_with("spawn failed")));
    }
}
