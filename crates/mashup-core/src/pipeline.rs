//! Pipeline orchestration: download, extract, trim, merge

use crate::config::Config;
use crate::downloader::{search_expression, Downloader};
use crate::error::MashupError;
use crate::extractor::Extractor;
use crate::merger::Merger;
use crate::probe::Prober;
use crate::report::RunReport;
use crate::trimmer::Trimmer;
use crate::workspace::RunWorkspace;

use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::info;

/// Pipeline configuration for a single run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Search term, usually a singer's name
    pub singer: String,
    /// How many search results to download
    pub video_count: u32,
    /// Leading window kept from each clip
    pub trim_window: Duration,
    /// Final merged `.wav` file
    pub output: PathBuf,
    /// Keep the run workspace for inspection
    pub keep_workspace: bool,
}

/// Pipeline progress stages
#[derive(Debug, Clone)]
pub enum PipelineStage {
    Provisioning,
    Downloading { query: String },
    Extracting,
    Trimming { window: Duration },
    Merging,
    Complete { output: PathBuf, duration: Duration },
    Failed { stage: String, error: String },
}

/// Main processing pipeline
pub struct Pipeline {
    config: PipelineConfig,
    app: Config,
    progress_tx: mpsc::Sender<PipelineStage>,
}

impl Pipeline {
    pub fn new(config: PipelineConfig, app: Config, progress_tx: mpsc::Sender<PipelineStage>) -> Self {
        Self {
            config,
            app,
            progress_tx,
        }
    }

    pub async fn run(&self) -> Result<RunReport, MashupError> {
        let start_time = Instant::now();

        // Resolve tool paths up front so a missing binary fails before any
        // directories are created
        let yt_dlp_path = self.app.yt_dlp_path()?;
        let ffmpeg_path = self.app.ffmpeg_path()?;
        let ffprobe_path = self.app.ffprobe_path()?;

        // 0. Provision the run workspace
        let _ = self.progress_tx.send(PipelineStage::Provisioning).await;

        let mut workspace = RunWorkspace::provision(self.app.workspace_root()).map_err(|e| {
            let _ = self.progress_tx.try_send(PipelineStage::Failed {
                stage: "provision".to_string(),
                error: e.to_string(),
            });
            e
        })?;

        // Detach cleanup up front so a failed run leaves the tree behind
        // for inspection too
        if self.config.keep_workspace || self.app.workspace.keep {
            workspace.keep();
        }

        info!(
            "Starting run {} for: {}",
            workspace.run_id(),
            self.config.singer
        );

        // 1. Download search results
        let _ = self.progress_tx.send(PipelineStage::Downloading {
            query: search_expression(&self.config.singer, self.config.video_count),
        }).await;

        let downloader = Downloader::new(yt_dlp_path, self.app.download.format.clone());
        let download = downloader
            .download_search(
                &self.config.singer,
                self.config.video_count,
                &workspace.videos(),
            )
            .await
            .map_err(|e| {
                let _ = self.progress_tx.try_send(PipelineStage::Failed {
                    stage: "download".to_string(),
                    error: e.to_string(),
                });
                e
            })?;

        // 2. Extract audio tracks
        let _ = self.progress_tx.send(PipelineStage::Extracting).await;

        let prober = Prober::new(ffprobe_path);
        let extractor = Extractor::new(
            ffmpeg_path.clone(),
            prober,
            self.app.audio.mp3_vbr_quality,
        );
        let extract = extractor
            .extract_dir(&workspace.videos(), &workspace.audio())
            .await
            .map_err(|e| {
                let _ = self.progress_tx.try_send(PipelineStage::Failed {
                    stage: "extract".to_string(),
                    error: e.to_string(),
                });
                e
            })?;

        // 3. Trim each clip to the leading window
        let _ = self.progress_tx.send(PipelineStage::Trimming {
            window: self.config.trim_window,
        }).await;

        let trimmer = Trimmer::new(
            ffmpeg_path.clone(),
            self.app.audio.sample_rate,
            self.app.audio.channels,
        );
        let trim = trimmer
            .trim_dir(
                &workspace.audio(),
                &workspace.trimmed(),
                self.config.trim_window,
            )
            .await
            .map_err(|e| {
                let _ = self.progress_tx.try_send(PipelineStage::Failed {
                    stage: "trim".to_string(),
                    error: e.to_string(),
                });
                e
            })?;

        // 4. Merge into the final mashup
        let _ = self.progress_tx.send(PipelineStage::Merging).await;

        if let Some(parent) = self.config.output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let merger = Merger::new(
            ffmpeg_path,
            self.app.audio.sample_rate,
            self.app.audio.channels,
        );
        let merge = merger
            .merge_dir(&workspace.trimmed(), &self.config.output)
            .await
            .map_err(|e| {
                let _ = self.progress_tx.try_send(PipelineStage::Failed {
                    stage: "merge".to_string(),
                    error: e.to_string(),
                });
                e
            })?;

        let duration = start_time.elapsed();
        info!(
            "Run complete: {} ({:.1}s)",
            self.config.output.display(),
            duration.as_secs_f32()
        );

        let _ = self.progress_tx.send(PipelineStage::Complete {
            output: self.config.output.clone(),
            duration,
        }).await;

        Ok(RunReport {
            run_id: workspace.run_id(),
            download,
            extract,
            trim,
            merge,
            output: self.config.output.clone(),
            elapsed: duration,
        })
    }
}
