//! Audio extraction from downloaded videos using FFmpeg

use crate::error::{ExtractError, ProbeError};
use crate::probe::Prober;
use crate::report::{Stage, StageReport};
use crate::workspace::files_with_extension;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

/// Video containers the extractor recognizes
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm"];

/// Extension written for extracted audio
pub const AUDIO_EXT: &str = "mp3";

#[derive(Debug)]
pub struct Extractor {
    ffmpeg_path: PathBuf,
    prober: Prober,
    vbr_quality: u8,
}

enum ExtractedAudio {
    Written,
    NoAudioStream,
}

impl Extractor {
    pub fn new(ffmpeg_path: PathBuf, prober: Prober, vbr_quality: u8) -> Self {
        Self {
            ffmpeg_path,
            prober,
            vbr_quality,
        }
    }

    /// Extract the audio track of every recognized video in `src` into
    /// `dest`, named after the video with an `.mp3` extension.
    ///
    /// Videos without an audio stream are skipped. A video that fails to
    /// convert is recorded and the rest of the batch continues; only a
    /// missing tool aborts the stage.
    pub async fn extract_dir(&self, src: &Path, dest: &Path) -> Result<StageReport, ExtractError> {
        let videos = files_with_extension(src, VIDEO_EXTENSIONS)?;
        let mut report = StageReport::new(Stage::Extract);

        if videos.is_empty() {
            info!("No video files in {}", src.display());
            return Ok(report);
        }
        info!("Extracting audio from {} video(s)", videos.len());

        for video in videos {
            let name = video
                .file_name()
                .unwrap_or(video.as_os_str())
                .to_string_lossy()
                .into_owned();
            let output = dest.join(audio_file_name(&video));

            match self.extract_one(&video, &output).await {
                Ok(ExtractedAudio::Written) => {
                    info!("Extracted audio from {}", name);
                    report.completed_item(name, output);
                }
                Ok(ExtractedAudio::NoAudioStream) => {
                    info!("No audio stream in {}, skipping", name);
                    report.skipped_item(name, "no audio stream");
                }
                Err(e) => {
                    let tool_missing = matches!(
                        e,
                        ExtractError::FfmpegNotFound
                            | ExtractError::Probe(ProbeError::FfprobeNotFound)
                    );
                    if tool_missing {
                        return Err(e);
                    }
                    warn!("Failed to extract audio from {}: {}", name, e);
                    report.failed_item(name, e.to_string());
                }
            }
        }

        Ok(report)
    }

    async fn extract_one(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<ExtractedAudio, ExtractError> {
        if !self.prober.has_audio_stream(input).await? {
            return Ok(ExtractedAudio::NoAudioStream);
        }

        let status = Command::new(&self.ffmpeg_path)
            .args(["-hide_banner", "-loglevel", "error"])
            .arg("-i")
            .arg(input)
            // Drop the video stream, encode the audio as VBR MP3
            .args(["-vn", "-c:a", "libmp3lame"])
            .args(["-q:a", &self.vbr_quality.to_string()])
            .arg("-y")
            .arg(output)
            .status()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExtractError::FfmpegNotFound
                } else {
                    ExtractError::Io(e)
                }
            })?;

        if !status.success() {
            return Err(ExtractError::FfmpegFailed(status.code()));
        }
        Ok(ExtractedAudio::Written)
    }
}

/// Output name for a video's extracted audio: same stem, `.mp3`
fn audio_file_name(video: &Path) -> PathBuf {
    PathBuf::from(video.file_name().unwrap_or_default()).with_extension(AUDIO_EXT)
}
