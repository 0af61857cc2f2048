//! Mashup job queue and worker pool
//!
//! Accepted requests become queued jobs. A fixed pool of workers drains
//! the queue, each running the whole pipeline for one job at a time, so a
//! slow download can never wedge the HTTP handlers.

use chrono::{DateTime, Utc};
use mashup_core::{Config, Pipeline, PipelineConfig, PipelineStage, RunReport};
use serde::Serialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

/// What a job is doing right now
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum JobState {
    Queued,
    Running { stage: String },
    Completed { report: RunReport },
    Failed { error: String },
    Cancelled,
}

impl JobState {
    fn name(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Running { .. } => "running",
            JobState::Completed { .. } => "completed",
            JobState::Failed { .. } => "failed",
            JobState::Cancelled => "cancelled",
        }
    }
}

/// A mashup request accepted by the service
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: Uuid,
    pub singer: String,
    pub n_videos: u32,
    pub trim_duration: u64,
    /// Contact address supplied with the request. Stored with the job;
    /// results are fetched over HTTP, nothing is mailed out.
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub state: JobState,
    /// Where the merged file lands; internal, served via the download route
    #[serde(skip)]
    pub output: PathBuf,
}

/// Result of a cancellation attempt
#[derive(Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    Cancelled,
    /// Job exists but already left the queue
    NotCancellable(&'static str),
    NotFound,
}

#[derive(Clone)]
pub struct JobStore {
    jobs: Arc<Mutex<HashMap<Uuid, Job>>>,
    queue_tx: mpsc::Sender<Uuid>,
    output_dir: PathBuf,
}

impl JobStore {
    pub fn new(queue_tx: mpsc::Sender<Uuid>, output_dir: PathBuf) -> Self {
        Self {
            jobs: Arc::new(Mutex::new(HashMap::new())),
            queue_tx,
            output_dir,
        }
    }

    /// Record a new job and hand it to the worker queue
    pub fn submit(
        &self,
        singer: &str,
        n_videos: u32,
        trim_duration: u64,
        email: &str,
    ) -> Result<Job, &'static str> {
        let id = Uuid::new_v4();
        let job = Job {
            id,
            singer: singer.to_string(),
            n_videos,
            trim_duration,
            email: email.to_string(),
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            state: JobState::Queued,
            output: self.output_dir.join(format!("{}.wav", id)),
        };

        self.jobs.lock().unwrap().insert(id, job.clone());

        if let Err(e) = self.queue_tx.try_send(id) {
            self.jobs.lock().unwrap().remove(&id);
            return Err(match e {
                mpsc::error::TrySendError::Full(_) => "job queue is full, try again later",
                mpsc::error::TrySendError::Closed(_) => "workers are not running",
            });
        }

        Ok(job)
    }

    pub fn get(&self, id: Uuid) -> Option<Job> {
        self.jobs.lock().unwrap().get(&id).cloned()
    }

    /// Cancel a job that has not started yet. The queue entry stays behind;
    /// workers skip ids whose job is no longer queued.
    pub fn cancel(&self, id: Uuid) -> CancelOutcome {
        let mut jobs = self.jobs.lock().unwrap();
        match jobs.get_mut(&id) {
            None => CancelOutcome::NotFound,
            Some(job) => match job.state {
                JobState::Queued => {
                    job.state = JobState::Cancelled;
                    job.finished_at = Some(Utc::now());
                    CancelOutcome::Cancelled
                }
                ref other => CancelOutcome::NotCancellable(other.name()),
            },
        }
    }

    /// Move a queued job into the running state. Returns None when the job
    /// was cancelled while waiting (or never existed).
    fn begin(&self, id: Uuid) -> Option<Job> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs.get_mut(&id)?;
        if !matches!(job.state, JobState::Queued) {
            return None;
        }
        job.state = JobState::Running {
            stage: "provisioning".to_string(),
        };
        job.started_at = Some(Utc::now());
        Some(job.clone())
    }

    fn set_stage(&self, id: Uuid, stage: &str) {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            if matches!(job.state, JobState::Running { .. }) {
                job.state = JobState::Running {
                    stage: stage.to_string(),
                };
            }
        }
    }

    fn complete(&self, id: Uuid, report: RunReport) {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            job.state = JobState::Completed { report };
            job.finished_at = Some(Utc::now());
        }
    }

    fn fail(&self, id: Uuid, error: String) {
        let mut jobs = self.jobs.lock().unwrap();
        if let Some(job) = jobs.get_mut(&id) {
            job.state = JobState::Failed { error };
            job.finished_at = Some(Utc::now());
        }
    }
}

/// Start `count` workers draining the job queue
pub fn spawn_workers(
    count: usize,
    store: JobStore,
    config: Config,
    queue_rx: mpsc::Receiver<Uuid>,
) {
    let queue_rx = Arc::new(tokio::sync::Mutex::new(queue_rx));
    for worker_id in 0..count {
        let queue_rx = Arc::clone(&queue_rx);
        let store = store.clone();
        let config = config.clone();
        tokio::spawn(async move {
            loop {
                let job_id = { queue_rx.lock().await.recv().await };
                let Some(job_id) = job_id else { break };
                run_job(worker_id, &store, &config, job_id).await;
            }
            debug!("Worker {} shutting down", worker_id);
        });
    }
    info!("Started {} worker(s)", count);
}

async fn run_job(worker_id: usize, store: &JobStore, config: &Config, job_id: Uuid) {
    let Some(job) = store.begin(job_id) else {
        debug!("Skipping job {} (cancelled or unknown)", job_id);
        return;
    };
    info!("Worker {} starting job {} ({})", worker_id, job_id, job.singer);

    let pipeline_config = PipelineConfig {
        singer: job.singer.clone(),
        video_count: job.n_videos,
        trim_window: Duration::from_secs(job.trim_duration),
        output: job.output.clone(),
        keep_workspace: false,
    };

    // Mirror coarse pipeline progress into the job record so the status
    // endpoint has something to show
    let (tx, mut rx) = mpsc::channel(32);
    let stage_store = store.clone();
    let stage_handle = tokio::spawn(async move {
        while let Some(stage) = rx.recv().await {
            if let Some(name) = stage_name(&stage) {
                stage_store.set_stage(job_id, name);
            }
        }
    });

    // Dropping the pipeline closes the progress channel, which lets the
    // mirror task exit
    let result = Pipeline::new(pipeline_config, config.clone(), tx).run().await;
    let _ = stage_handle.await;

    match result {
        Ok(report) => {
            info!(
                "Job {} complete: {} ({:.1}s)",
                job_id,
                report.output.display(),
                report.elapsed.as_secs_f32()
            );
            store.complete(job_id, report);
        }
        Err(e) => {
            error!("Job {} failed: {}", job_id, e);
            store.fail(job_id, e.to_string());
        }
    }
}

fn stage_name(stage: &PipelineStage) -> Option<&'static str> {
    match stage {
        PipelineStage::Provisioning => Some("provisioning"),
        PipelineStage::Downloading { .. } => Some("downloading"),
        PipelineStage::Extracting => Some("extracting"),
        PipelineStage::Trimming { .. } => Some("trimming"),
        PipelineStage::Merging => Some("merging"),
        PipelineStage::Complete { .. } | PipelineStage::Failed { .. } => None,
    }
}
