//! Concatenation of trimmed clips into the final mashup

use crate::error::MergeError;
use crate::report::{Stage, StageReport};
use crate::trimmer::write_empty_wav;
use crate::workspace::files_with_extension;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};

/// Extensions accepted as merge input
const MERGE_EXTENSIONS: &[&str] = &["wav", "mp3"];

#[derive(Debug)]
pub struct Merger {
    ffmpeg_path: PathBuf,
    sample_rate: u32,
    channels: u8,
}

impl Merger {
    pub fn new(ffmpeg_path: PathBuf, sample_rate: u32, channels: u8) -> Self {
        Self {
            ffmpeg_path,
            sample_rate,
            channels,
        }
    }

    /// Concatenate every trimmed clip in `src` into `output`, in ascending
    /// file name order, overwriting `output` if it exists.
    ///
    /// An empty `src` still produces a playable output: a WAV with a valid
    /// header and zero frames.
    pub async fn merge_dir(&self, src: &Path, output: &Path) -> Result<StageReport, MergeError> {
        let inputs = files_with_extension(src, MERGE_EXTENSIONS)?;
        let mut report = StageReport::new(Stage::Merge);

        if inputs.is_empty() {
            info!("Nothing to merge; writing empty {}", output.display());
            write_empty_wav(output, self.sample_rate, self.channels)?;
            return Ok(report);
        }

        for input in &inputs {
            debug!("Merge input: {}", input.display());
        }
        self.concat(&inputs, output).await?;

        for input in inputs {
            let name = input
                .file_name()
                .unwrap_or(input.as_os_str())
                .to_string_lossy()
                .into_owned();
            report.completed_item(name, output.to_path_buf());
        }
        info!(
            "Merged {} clip(s) into {}",
            report.completed(),
            output.display()
        );
        Ok(report)
    }

    async fn concat(&self, inputs: &[PathBuf], output: &Path) -> Result<(), MergeError> {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-hide_banner", "-loglevel", "error"]);
        for input in inputs {
            cmd.arg("-i").arg(input);
        }
        cmd.arg("-filter_complex").arg(concat_filter(inputs.len()));
        cmd.args(["-map", "[merged]"]);
        cmd.args(["-c:a", "pcm_s16le"]);
        cmd.args(["-ar", &self.sample_rate.to_string()]);
        cmd.args(["-ac", &self.channels.to_string()]);
        cmd.arg("-y").arg(output);

        let status = cmd.status().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MergeError::FfmpegNotFound
            } else {
                MergeError::Io(e)
            }
        })?;

        if !status.success() {
            return Err(MergeError::FfmpegFailed(status.code()));
        }
        Ok(())
    }
}

/// Filtergraph concatenating the audio of `n` inputs in argument order:
/// `[0:a][1:a]...concat=n=<n>:v=0:a=1[merged]`
fn concat_filter(n: usize) -> String {
    let mut filter = String::new();
    for i in 0..n {
        filter.push_str(&format!("[{}:a]", i));
    }
    filter.push_str(&format!("concat=n={}:v=0:a=1[merged]", n));
    filter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_filter_covers_every_input() {
        assert_eq!(concat_filter(1), "[0:a]concat=n=1:v=0:a=1[merged]");
        assert_eq!(
            concat_filter(3),
            "[0:a][1:a][2:a]concat=n=3:v=0:a=1[merged]"
        );
    }

    #[test]
    fn merge_inputs_are_ordered_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.wav", "a.wav", "c.wav"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }

        let inputs = files_with_extension(dir.path(), MERGE_EXTENSIONS).unwrap();
        let names: Vec<_> = inputs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.wav", "b.wav", "c.wav"]);
    }

    #[tokio::test]
    async fn empty_source_writes_zero_frame_wav() {
        let src = tempfile::tempdir().unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let output = out_dir.path().join("mashup.wav");
        let merger = Merger::new(PathBuf::from("/nonexistent/ffmpeg"), 44100, 2);

        let report = merger.merge_dir(src.path(), &output).await.unwrap();

        assert_eq!(report.completed(), 0);
        let reader = hound::WavReader::open(&output).unwrap();
        assert_eq!(reader.duration(), 0);
        assert_eq!(reader.spec().channels, 2);
    }
}
