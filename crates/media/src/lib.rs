pub mod aspect;
pub mod faststart;
pub mod probe;

use std::path::PathBuf;
use thiserror::Error;

pub use aspect::classify;
pub use faststart::{FfmpegRemuxer, Remuxer};
pub use probe::{FfprobeProber, Prober, StreamDimensions};

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("ffprobe failed: {0}")]
    Probe(String),
    #[error("ffmpeg failed: {0}")]
    Remux(String),
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Locations of the external media tools.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
        }
    }
}
