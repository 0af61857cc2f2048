//! Leading-window trims of extracted audio using FFmpeg

use crate::error::TrimError;
use crate::extractor::AUDIO_EXT;
use crate::report::{Stage, StageReport};
use crate::workspace::files_with_extension;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;
use tracing::{info, warn};

/// Extension written for trimmed clips
pub const TRIMMED_EXT: &str = "wav";

#[derive(Debug)]
pub struct Trimmer {
    ffmpeg_path: PathBuf,
    sample_rate: u32,
    channels: u8,
}

impl Trimmer {
    pub fn new(ffmpeg_path: PathBuf, sample_rate: u32, channels: u8) -> Self {
        Self {
            ffmpeg_path,
            sample_rate,
            channels,
        }
    }

    /// Trim every extracted audio file in `src` to its leading `window`,
    /// written as PCM WAV into `dest`.
    ///
    /// A clip that fails to convert is recorded and the rest of the batch
    /// continues; only a missing FFmpeg aborts the stage.
    pub async fn trim_dir(
        &self,
        src: &Path,
        dest: &Path,
        window: Duration,
    ) -> Result<StageReport, TrimError> {
        let inputs = files_with_extension(src, &[AUDIO_EXT])?;
        let mut report = StageReport::new(Stage::Trim);

        if inputs.is_empty() {
            info!("No audio files in {}", src.display());
            return Ok(report);
        }
        info!(
            "Trimming {} clip(s) to the first {}s",
            inputs.len(),
            format_secs(window)
        );

        for input in inputs {
            let name = input
                .file_name()
                .unwrap_or(input.as_os_str())
                .to_string_lossy()
                .into_owned();
            let output = dest.join(trimmed_file_name(&input));

            match self.trim_one(&input, &output, window).await {
                Ok(()) => {
                    info!("Trimmed {}", name);
                    report.completed_item(name, output);
                }
                Err(TrimError::FfmpegNotFound) => return Err(TrimError::FfmpegNotFound),
                Err(e) => {
                    warn!("Failed to trim {}: {}", name, e);
                    report.failed_item(name, e.to_string());
                }
            }
        }

        Ok(report)
    }

    /// Keep the first `window` of `input` as PCM WAV at `output`.
    ///
    /// Inputs shorter than the window are kept whole. A zero window writes
    /// a valid zero-frame WAV without invoking FFmpeg.
    pub async fn trim_one(
        &self,
        input: &Path,
        output: &Path,
        window: Duration,
    ) -> Result<(), TrimError> {
        if window.is_zero() {
            write_empty_wav(output, self.sample_rate, self.channels)?;
            return Ok(());
        }

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-hide_banner", "-loglevel", "error"]);
        cmd.arg("-i").arg(input);
        cmd.args(trim_args(window, self.sample_rate, self.channels));
        cmd.arg("-y").arg(output);

        let status = cmd.status().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TrimError::FfmpegNotFound
            } else {
                TrimError::Io(e)
            }
        })?;

        if !status.success() {
            return Err(TrimError::FfmpegFailed(status.code()));
        }
        Ok(())
    }
}

/// FFmpeg arguments for a leading-window PCM re-encode.
///
/// Every clip comes out with the same sample rate, sample format and
/// channel count so the merge stage can concatenate them directly.
fn trim_args(window: Duration, sample_rate: u32, channels: u8) -> Vec<String> {
    vec![
        "-t".to_string(),
        format_secs(window),
        "-c:a".to_string(),
        "pcm_s16le".to_string(),
        "-ar".to_string(),
        sample_rate.to_string(),
        "-ac".to_string(),
        channels.to_string(),
    ]
}

/// Seconds with millisecond precision, whole seconds without a fraction
fn format_secs(window: Duration) -> String {
    if window.subsec_nanos() == 0 {
        window.as_secs().to_string()
    } else {
        format!("{:.3}", window.as_secs_f64())
    }
}

/// Output name for a trimmed clip: same stem, `.wav`
fn trimmed_file_name(input: &Path) -> PathBuf {
    PathBuf::from(input.file_name().unwrap_or_default()).with_extension(TRIMMED_EXT)
}

/// Write a WAV file with a valid header and zero audio frames
pub(crate) fn write_empty_wav(
    path: &Path,
    sample_rate: u32,
    channels: u8,
) -> Result<(), hound::Error> {
    let spec = WavSpec {
        channels: channels as u16,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let writer = WavWriter::create(path, spec)?;
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_seconds_format_without_fraction() {
        assert_eq!(format_secs(Duration::from_secs(20)), "20");
        assert_eq!(format_secs(Duration::from_secs(1)), "1");
    }

    #[test]
    fn fractional_seconds_keep_milliseconds() {
        assert_eq!(format_secs(Duration::from_millis(1500)), "1.500");
        assert_eq!(format_secs(Duration::from_millis(250)), "0.250");
    }

    #[test]
    fn trim_args_pin_the_output_format() {
        let args = trim_args(Duration::from_secs(10), 44100, 2);
        assert_eq!(
            args,
            vec!["-t", "10", "-c:a", "pcm_s16le", "-ar", "44100", "-ac", "2"]
        );
    }

    #[test]
    fn trimmed_file_name_swaps_extension() {
        assert_eq!(
            trimmed_file_name(Path::new("audio/My Song.mp3")),
            PathBuf::from("My Song.wav")
        );
    }

    #[test]
    fn empty_wav_has_header_but_no_frames() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.wav");
        write_empty_wav(&path, 44100, 2).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.duration(), 0);
        assert_eq!(reader.spec().sample_rate, 44100);
        assert_eq!(reader.spec().channels, 2);
        assert_eq!(reader.spec().bits_per_sample, 16);
    }

    #[tokio::test]
    async fn zero_window_skips_ffmpeg_entirely() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("clip.wav");
        let trimmer = Trimmer::new(PathBuf::from("/nonexistent/ffmpeg"), 44100, 2);

        trimmer
            .trim_one(Path::new("ignored.mp3"), &output, Duration::ZERO)
            .await
            .unwrap();

        let reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.duration(), 0);
    }
}
