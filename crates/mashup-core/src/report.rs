//! Per-item and per-stage run reporting

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Download,
    Extract,
    Trim,
    Merge,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Download => "download",
            Stage::Extract => "extract",
            Stage::Trim => "trim",
            Stage::Merge => "merge",
        };
        write!(f, "{}", name)
    }
}

/// What happened to one work item within a stage
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemOutcome {
    Completed,
    Skipped { reason: String },
    Failed { reason: String },
}

/// One work item processed by a stage
#[derive(Debug, Clone, Serialize)]
pub struct ItemReport {
    /// What the item was (a file name, or a search result id)
    pub source: String,
    /// File produced by the stage, if any
    pub output: Option<PathBuf>,
    pub outcome: ItemOutcome,
}

/// Everything a stage did during one run
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub items: Vec<ItemReport>,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            items: Vec::new(),
        }
    }

    pub fn completed_item(&mut self, source: impl Into<String>, output: PathBuf) {
        self.items.push(ItemReport {
            source: source.into(),
            output: Some(output),
            outcome: ItemOutcome::Completed,
        });
    }

    pub fn skipped_item(&mut self, source: impl Into<String>, reason: impl Into<String>) {
        self.items.push(ItemReport {
            source: source.into(),
            output: None,
            outcome: ItemOutcome::Skipped {
                reason: reason.into(),
            },
        });
    }

    pub fn failed_item(&mut self, source: impl Into<String>, reason: impl Into<String>) {
        self.items.push(ItemReport {
            source: source.into(),
            output: None,
            outcome: ItemOutcome::Failed {
                reason: reason.into(),
            },
        });
    }

    pub fn completed(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Completed))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items
            .iter()
            .filter(|i| matches!(i.outcome, ItemOutcome::Failed { .. }))
            .count()
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} completed, {} skipped, {} failed",
            self.stage,
            self.completed(),
            self.skipped(),
            self.failed()
        )
    }
}

/// Full account of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub download: StageReport,
    pub extract: StageReport,
    pub trim: StageReport,
    pub merge: StageReport,
    /// Final merged file
    pub output: PathBuf,
    pub elapsed: Duration,
}

impl RunReport {
    /// Stage reports in execution order
    pub fn stages(&self) -> [&StageReport; 4] {
        [&self.download, &self.extract, &self.trim, &self.merge]
    }

    /// True when at least one item failed somewhere in the run
    pub fn has_failures(&self) -> bool {
        self.stages().iter().any(|s| s.failed() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_report_counts_outcomes() {
        let mut report = StageReport::new(Stage::Extract);
        report.completed_item("a.mp4", PathBuf::from("a.mp3"));
        report.completed_item("b.mp4", PathBuf::from("b.mp3"));
        report.skipped_item("silent.mp4", "no audio stream");
        report.failed_item("broken.mp4", "ffmpeg exited with 1");

        assert_eq!(report.completed(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
    }

    #[test]
    fn stage_report_display_is_a_summary_line() {
        let mut report = StageReport::new(Stage::Download);
        report.completed_item("clip", PathBuf::from("clip.mp4"));
        assert_eq!(report.to_string(), "download: 1 completed, 0 skipped, 0 failed");
    }

    #[test]
    fn item_outcome_serializes_with_status_tag() {
        let outcome = ItemOutcome::Skipped {
            reason: "no audio stream".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "no audio stream");
    }

    #[test]
    fn run_report_flags_failures() {
        let ok = StageReport::new(Stage::Download);
        let mut bad = StageReport::new(Stage::Trim);
        bad.failed_item("x.mp3", "ffmpeg exited with 1");

        let report = RunReport {
            run_id: Uuid::new_v4(),
            download: ok.clone(),
            extract: ok.clone(),
            trim: bad,
            merge: ok,
            output: PathBuf::from("out.wav"),
            elapsed: Duration::from_secs(3),
        };
        assert!(report.has_failures());
    }
}
