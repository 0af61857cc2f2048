use assert_cmd::Command;
use predicates::str::contains;
use std::error::Error;
use tempfile::tempdir;

// Helper function to get the path to the compiled binary
fn mashup_cmd() -> Command {
    Command::cargo_bin("mashup").expect("Failed to find mashup binary")
}

fn scratch_is_empty(dir: &std::path::Path) -> bool {
    std::fs::read_dir(dir).map(|mut d| d.next().is_none()).unwrap_or(false)
}

#[test]
fn zero_videos_is_rejected_before_any_work() -> Result<(), Box<dyn Error>> {
    let scratch = tempdir()?;
    let output = scratch.path().join("out.wav");

    let mut cmd = mashup_cmd();
    cmd.env("MASHUP_WORKSPACE_ROOT", scratch.path());
    cmd.args(["create", "Test Singer", "0", "20"]).arg(&output);

    cmd.assert().failure().stderr(contains("invalid value '0'"));

    // No run workspace, no output file
    assert!(scratch_is_empty(scratch.path()));
    Ok(())
}

#[test]
fn negative_trim_is_rejected_before_any_work() -> Result<(), Box<dyn Error>> {
    let scratch = tempdir()?;
    let output = scratch.path().join("out.wav");

    let mut cmd = mashup_cmd();
    cmd.env("MASHUP_WORKSPACE_ROOT", scratch.path());
    cmd.args(["create", "Test Singer", "3", "-5"]).arg(&output);

    cmd.assert()
        .failure()
        .stderr(contains("trim duration must be a positive number of seconds"));

    assert!(scratch_is_empty(scratch.path()));
    Ok(())
}

#[test]
fn zero_trim_is_rejected() -> Result<(), Box<dyn Error>> {
    let scratch = tempdir()?;
    let output = scratch.path().join("out.wav");

    let mut cmd = mashup_cmd();
    cmd.env("MASHUP_WORKSPACE_ROOT", scratch.path());
    cmd.args(["create", "Test Singer", "3", "0"]).arg(&output);

    cmd.assert()
        .failure()
        .stderr(contains("trim duration must be a positive number of seconds"));

    assert!(scratch_is_empty(scratch.path()));
    Ok(())
}

#[test]
fn non_wav_output_is_rejected() -> Result<(), Box<dyn Error>> {
    let scratch = tempdir()?;
    let output = scratch.path().join("out.mp3");

    let mut cmd = mashup_cmd();
    cmd.env("MASHUP_WORKSPACE_ROOT", scratch.path());
    cmd.args(["create", "Test Singer", "3", "20"]).arg(&output);

    cmd.assert()
        .failure()
        .stderr(contains("output file must end in .wav"));

    assert!(scratch_is_empty(scratch.path()));
    Ok(())
}

#[test]
fn bare_positionals_validate_like_create() -> Result<(), Box<dyn Error>> {
    let scratch = tempdir()?;
    let output = scratch.path().join("out.wav");

    let mut cmd = mashup_cmd();
    cmd.env("MASHUP_WORKSPACE_ROOT", scratch.path());
    cmd.args(["Test Singer", "0", "20"]).arg(&output);

    cmd.assert().failure().stderr(contains("invalid value '0'"));
    assert!(scratch_is_empty(scratch.path()));
    Ok(())
}

#[test]
fn partial_bare_positionals_show_usage() -> Result<(), Box<dyn Error>> {
    let mut cmd = mashup_cmd();
    cmd.arg("Test Singer");

    cmd.assert()
        .failure()
        .stderr(contains("expected <SINGER> <N_VIDEOS> <TRIM_DURATION> <OUTPUT>"));
    Ok(())
}

#[test]
fn no_arguments_prints_help() -> Result<(), Box<dyn Error>> {
    let mut cmd = mashup_cmd();
    cmd.assert().success().stdout(contains("Usage"));
    Ok(())
}

#[test]
fn doctor_reports_tool_status() -> Result<(), Box<dyn Error>> {
    let mut cmd = mashup_cmd();
    cmd.arg("doctor");
    cmd.assert().success().stdout(contains("dependency check"));
    Ok(())
}

#[test]
fn config_prints_effective_settings() -> Result<(), Box<dyn Error>> {
    let mut cmd = mashup_cmd();
    cmd.arg("config");
    cmd.assert()
        .success()
        .stdout(contains("[download]"))
        .stdout(contains("MASHUP_*"));
    Ok(())
}
