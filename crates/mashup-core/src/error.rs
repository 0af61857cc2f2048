//! Error types for mashup-core

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MashupError>;

/// Top-level error type
#[derive(Error, Debug)]
pub enum MashupError {
    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Audio extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error("Trim failed: {0}")]
    Trim(#[from] TrimError),

    #[error("Merge failed: {0}")]
    Merge(#[from] MergeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the download stage
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("yt-dlp not found. Install it and make sure it is on PATH")]
    YtDlpNotFound,

    #[error("yt-dlp failed with exit code: {0:?}")]
    YtDlpFailed(Option<i32>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the audio extraction stage
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("FFmpeg not found. Install it and make sure it is on PATH")]
    FfmpegNotFound,

    #[error("FFmpeg failed with exit code: {0:?}")]
    FfmpegFailed(Option<i32>),

    #[error("Probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the trim stage
#[derive(Error, Debug)]
pub enum TrimError {
    #[error("FFmpeg not found. Install it and make sure it is on PATH")]
    FfmpegNotFound,

    #[error("FFmpeg failed with exit code: {0:?}")]
    FfmpegFailed(Option<i32>),

    #[error("WAV write failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the merge stage
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("FFmpeg not found. Install it and make sure it is on PATH")]
    FfmpegNotFound,

    #[error("FFmpeg failed with exit code: {0:?}")]
    FfmpegFailed(Option<i32>),

    #[error("WAV write failed: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from ffprobe inspection
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("ffprobe not found. Install FFmpeg and make sure ffprobe is on PATH")]
    FfprobeNotFound,

    #[error("ffprobe failed with exit code: {0:?}")]
    FfprobeFailed(Option<i32>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
