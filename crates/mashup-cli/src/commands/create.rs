use anyhow::{bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::args::CreateArgs;
use mashup_core::{
    config::Config,
    pipeline::{Pipeline, PipelineConfig, PipelineStage},
};

pub async fn run(args: &CreateArgs, config_path: Option<&Path>) -> Result<()> {
    // Reject bad arguments before any directory or file is touched
    validate(args)?;

    let config = Config::load(config_path)?;

    let pipeline_config = PipelineConfig {
        singer: args.singer.clone(),
        video_count: args.n_videos,
        trim_window: Duration::from_secs(args.trim_duration as u64),
        output: args.output.clone(),
        keep_workspace: args.keep_workspace,
    };

    // Create progress channel
    let (tx, mut rx) = mpsc::channel(32);

    // Create progress bar
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{elapsed_precise}] {bar:40.cyan/blue} {msg}",
        )?
        .progress_chars("=>-"),
    );

    // Spawn progress handler
    let progress_handle = tokio::spawn(async move {
        while let Some(stage) = rx.recv().await {
            match stage {
                PipelineStage::Provisioning => {
                    pb.set_position(2);
                    pb.set_message("Provisioning workspace...");
                }
                PipelineStage::Downloading { query } => {
                    pb.set_position(10);
                    pb.set_message(format!("Downloading: {}", truncate(&query, 40)));
                }
                PipelineStage::Extracting => {
                    pb.set_position(45);
                    pb.set_message("Extracting audio...");
                }
                PipelineStage::Trimming { window } => {
                    pb.set_position(65);
                    pb.set_message(format!("Trimming to first {}s...", window.as_secs()));
                }
                PipelineStage::Merging => {
                    pb.set_position(85);
                    pb.set_message("Merging clips...");
                }
                PipelineStage::Complete { output, duration } => {
                    pb.set_position(100);
                    pb.finish_with_message(format!(
                        "Done: {} ({:.1}s)",
                        output.display(),
                        duration.as_secs_f32()
                    ));
                }
                PipelineStage::Failed { stage, error } => {
                    pb.abandon_with_message(format!("Failed at {}: {}", stage, error));
                }
            }
        }
    });

    // Run pipeline; dropping it closes the progress channel so the
    // handler task can finish
    let result = Pipeline::new(pipeline_config, config, tx).run().await;

    // Wait for progress handler
    progress_handle.await?;

    match result {
        Ok(report) => {
            println!();
            for stage in report.stages() {
                println!("  {}", stage);
            }
            if report.has_failures() {
                println!("\nSome items failed; the mashup was built from the rest.");
            }
            println!("\nOutput: {}", report.output.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("\nError: {}", e);
            Err(e.into())
        }
    }
}

fn validate(args: &CreateArgs) -> Result<()> {
    if args.trim_duration <= 0 {
        bail!(
            "trim duration must be a positive number of seconds (got {})",
            args.trim_duration
        );
    }
    let is_wav = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("wav"))
        .unwrap_or(false);
    if !is_wav {
        bail!(
            "output file must end in .wav (got {})",
            args.output.display()
        );
    }
    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn args(trim_duration: i64, output: &str) -> CreateArgs {
        CreateArgs {
            singer: "Test Singer".to_string(),
            n_videos: 3,
            trim_duration,
            output: PathBuf::from(output),
            keep_workspace: false,
        }
    }

    #[test]
    fn accepts_positive_trim_and_wav_output() {
        assert!(validate(&args(20, "out.wav")).is_ok());
        assert!(validate(&args(1, "some/dir/mix.WAV")).is_ok());
    }

    #[test]
    fn rejects_zero_and_negative_trim() {
        assert!(validate(&args(0, "out.wav")).is_err());
        assert!(validate(&args(-5, "out.wav")).is_err());
    }

    #[test]
    fn rejects_non_wav_output() {
        assert!(validate(&args(20, "out.mp3")).is_err());
        assert!(validate(&args(20, "out")).is_err());
        assert!(validate(&args(20, "out.wav.mp3")).is_err());
    }

    #[test]
    fn truncate_is_char_boundary_safe() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 8), "abcde...");
        // Multi-byte input must not split a character
        let cut = truncate("ααααααααααα", 8);
        assert_eq!(cut, "ααααα...");
    }
}
