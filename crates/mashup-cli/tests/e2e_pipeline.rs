//! Full pipeline run against real tools. Needs yt-dlp, ffmpeg and network
//! access, so it stays behind `--ignored`.

use assert_cmd::Command;
use std::error::Error;
use tempfile::tempdir;

#[test]
#[ignore = "requires yt-dlp, ffmpeg and network access"]
fn two_ten_second_clips_merge_to_twenty_seconds() -> Result<(), Box<dyn Error>> {
    let scratch = tempdir()?;
    let output = scratch.path().join("mashup.wav");

    let mut cmd = Command::cargo_bin("mashup")?;
    cmd.env("MASHUP_WORKSPACE_ROOT", scratch.path());
    cmd.args(["create", "Sonu Nigam", "2", "10"]).arg(&output);
    cmd.timeout(std::time::Duration::from_secs(600));
    cmd.assert().success();

    let reader = hound::WavReader::open(&output)?;
    let spec = reader.spec();
    assert_eq!(spec.channels, 2);
    assert_eq!(spec.sample_rate, 44100);

    let seconds = reader.duration() as f64 / spec.sample_rate as f64;
    // Two clips trimmed to 10s each; allow encoder frame padding
    assert!((seconds - 20.0).abs() < 1.0, "merged length was {}s", seconds);
    Ok(())
}
