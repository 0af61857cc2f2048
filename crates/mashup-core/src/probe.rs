//! Media inspection using ffprobe

use crate::error::ProbeError;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Prober {
    ffprobe_path: PathBuf,
}

impl Prober {
    pub fn new(ffprobe_path: PathBuf) -> Self {
        Self { ffprobe_path }
    }

    /// Number of audio streams in the container
    pub async fn count_audio_streams(&self, input: &Path) -> Result<usize, ProbeError> {
        let output = Command::new(&self.ffprobe_path)
            .args([
                "-v", "error",
                "-select_streams", "a",
                "-show_entries", "stream=codec_type",
                "-of", "csv=p=0",
            ])
            .arg(input)
            .output()
            .await
            .map_err(spawn_error)?;

        if !output.status.success() {
            return Err(ProbeError::FfprobeFailed(output.status.code()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let count = count_audio_lines(&stdout);
        debug!("{}: {} audio stream(s)", input.display(), count);
        Ok(count)
    }

    /// Whether the container has at least one audio stream
    pub async fn has_audio_stream(&self, input: &Path) -> Result<bool, ProbeError> {
        Ok(self.count_audio_streams(input).await? > 0)
    }
}

fn spawn_error(e: std::io::Error) -> ProbeError {
    if e.kind() == std::io::ErrorKind::NotFound {
        ProbeError::FfprobeNotFound
    } else {
        ProbeError::Io(e)
    }
}

fn count_audio_lines(stdout: &str) -> usize {
    stdout.lines().filter(|line| line.trim() == "audio").count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_audio_stream_lines() {
        assert_eq!(count_audio_lines("audio\naudio\n"), 2);
        assert_eq!(count_audio_lines("audio\n"), 1);
        assert_eq!(count_audio_lines(""), 0);
    }

    #[test]
    fn ignores_non_audio_lines() {
        // -select_streams a should only print audio rows, but don't rely on it
        assert_eq!(count_audio_lines("video\naudio\n\n"), 1);
    }
}
