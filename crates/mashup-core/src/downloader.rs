//! Video downloading from YouTube search using yt-dlp

use crate::error::DownloadError;
use crate::report::{Stage, StageReport};
use regex::Regex;
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// yt-dlp output template; titles become file names
const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

#[derive(Debug)]
pub struct Downloader {
    yt_dlp_path: PathBuf,
    format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub duration: Option<f64>,
}

/// One search result yt-dlp reported as failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadFailure {
    pub video_id: Option<String>,
    pub message: String,
}

impl Downloader {
    pub fn new(yt_dlp_path: PathBuf, format: String) -> Self {
        Self {
            yt_dlp_path,
            format,
        }
    }

    /// Search YouTube for `count` videos of `term` and download them into
    /// `dest`.
    ///
    /// One yt-dlp invocation covers the whole batch. Individual results
    /// that fail to download are recorded in the report and never abort
    /// the rest of the batch.
    pub async fn download_search(
        &self,
        term: &str,
        count: u32,
        dest: &Path,
    ) -> Result<StageReport, DownloadError> {
        let query = search_expression(term, count);
        info!("Searching for {} video(s): {}", count, term);

        let before = list_media_files(dest)?;

        let output = Command::new(&self.yt_dlp_path)
            .args([
                // Format selection: best muxed video+audio available
                "-f", &self.format,
                // Search results are single videos, never playlists
                "--no-playlist",
                // A dead result must not sink the rest of the batch
                "--ignore-errors",
                // Print one JSON metadata line per downloaded video
                "--print-json",
            ])
            .arg("-o")
            .arg(dest.join(OUTPUT_TEMPLATE))
            .arg(&query)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    DownloadError::YtDlpNotFound
                } else {
                    DownloadError::Io(e)
                }
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        for meta in parse_metadata_lines(&stdout) {
            info!(
                "Downloaded: {} ({}, {:.0}s)",
                meta.title,
                meta.id,
                meta.duration.unwrap_or(0.0)
            );
        }

        let failures = parse_error_lines(&stderr);
        let after = list_media_files(dest)?;
        let new_files: Vec<&PathBuf> = after.difference(&before).collect();

        // Nothing arrived and nothing was reported as a per-video failure:
        // the run itself is broken (bad network, broken extractor, ...)
        if new_files.is_empty() && failures.is_empty() && !output.status.success() {
            debug!("yt-dlp stderr: {}", stderr);
            return Err(DownloadError::YtDlpFailed(output.status.code()));
        }

        let mut report = StageReport::new(Stage::Download);
        for file in new_files {
            let name = file
                .file_name()
                .unwrap_or(file.as_os_str())
                .to_string_lossy()
                .into_owned();
            report.completed_item(name, file.clone());
        }
        for failure in failures {
            warn!("Download failed: {}", failure.message);
            let source = failure
                .video_id
                .unwrap_or_else(|| "search result".to_string());
            report.failed_item(source, failure.message);
        }

        info!(
            "Download finished: {} of {} requested ({} failed)",
            report.completed(),
            count,
            report.failed()
        );
        Ok(report)
    }
}

/// yt-dlp search expression for the first `count` results of `term`
pub fn search_expression(term: &str, count: u32) -> String {
    format!("ytsearch{}:{}", count, term)
}

/// Parse the per-video JSON metadata lines from yt-dlp stdout
fn parse_metadata_lines(stdout: &str) -> Vec<VideoMetadata> {
    stdout
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect()
}

/// Pull per-video failures out of yt-dlp stderr.
///
/// With `--ignore-errors`, each unavailable result produces one line of
/// the form `ERROR: [youtube] <id>: <message>` and the batch keeps going.
fn parse_error_lines(stderr: &str) -> Vec<DownloadFailure> {
    let id_pattern = Regex::new(r"^\[[^\]]+\]\s+(\S+?):").ok();
    stderr
        .lines()
        .filter_map(|line| line.trim().strip_prefix("ERROR:"))
        .map(|message| {
            let message = message.trim().to_string();
            let video_id = id_pattern
                .as_ref()
                .and_then(|re| re.captures(&message))
                .map(|caps| caps[1].to_string());
            DownloadFailure { video_id, message }
        })
        .collect()
}

/// Snapshot of the regular files in `dir`, minus yt-dlp scratch files
/// (`.part`, `.ytdl`) left behind by interrupted downloads
fn list_media_files(dir: &Path) -> std::io::Result<BTreeSet<PathBuf>> {
    let mut files = BTreeSet::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if is_scratch_file(&path) {
            continue;
        }
        files.insert(path);
    }
    Ok(files)
}

fn is_scratch_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("part") | Some("ytdl")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_expression_embeds_count_and_term() {
        assert_eq!(search_expression("sonu nigam", 10), "ytsearch10:sonu nigam");
        assert_eq!(search_expression("a", 1), "ytsearch1:a");
    }

    #[test]
    fn parses_metadata_lines_and_skips_noise() {
        let stdout = concat!(
            r#"{"id": "abc123", "title": "Song One", "duration": 215.0, "ext": "mp4"}"#,
            "\n",
            "not json\n",
            r#"{"id": "def456", "title": "Song Two", "ext": "webm"}"#,
            "\n"
        );
        let metas = parse_metadata_lines(stdout);
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[0].title, "Song One");
        assert_eq!(metas[1].duration, None);
    }

    #[test]
    fn parses_error_lines_with_video_ids() {
        let stderr = "\
[youtube] Extracting URL: https://www.youtube.com/watch?v=abc123
ERROR: [youtube] abc123: Video unavailable
ERROR: [youtube] def456: Private video. Sign in if you've been granted access
WARNING: unable to obtain file audio codec
";
        let failures = parse_error_lines(stderr);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].video_id.as_deref(), Some("abc123"));
        assert!(failures[0].message.contains("Video unavailable"));
        assert_eq!(failures[1].video_id.as_deref(), Some("def456"));
    }

    #[test]
    fn error_lines_without_ids_still_count() {
        let failures = parse_error_lines("ERROR: Unable to download webpage\n");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].video_id, None);
    }

    #[test]
    fn scratch_files_are_ignored() {
        assert!(is_scratch_file(Path::new("clip.mp4.part")));
        assert!(is_scratch_file(Path::new("clip.ytdl")));
        assert!(!is_scratch_file(Path::new("clip.mp4")));
    }

    #[test]
    fn list_media_files_skips_scratch_and_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.mp4"), b"").unwrap();
        std::fs::write(dir.path().join("two.webm.part"), b"").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();

        let files = list_media_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files.iter().next().unwrap().ends_with("one.mp4"));
    }
}
