//! Run-scoped working directories

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info};
use uuid::Uuid;

/// Stage directory receiving downloaded videos
pub const VIDEO_DIR: &str = "videos";
/// Stage directory receiving extracted audio
pub const AUDIO_DIR: &str = "audio";
/// Stage directory receiving trimmed clips
pub const TRIMMED_DIR: &str = "trimmed";

/// Working directory tree for a single pipeline run.
///
/// Stages hand files to each other through the three fixed-name
/// subdirectories. The parent directory is unique per run, so concurrent
/// runs never see each other's files.
#[derive(Debug)]
pub struct RunWorkspace {
    run_id: Uuid,
    base: PathBuf,
    // Present when the workspace lives under the system temp dir; dropping
    // it removes the whole tree unless `keep` was called.
    tempdir: Option<TempDir>,
}

impl RunWorkspace {
    /// Create the directory tree for a new run.
    ///
    /// With a configured `root` the tree is created at
    /// `<root>/mashup-<run_id>` and left in place after the run. Without
    /// one it lives in a temp directory that is deleted on drop.
    pub fn provision(root: Option<&Path>) -> std::io::Result<Self> {
        let run_id = Uuid::new_v4();
        let (base, tempdir) = match root {
            Some(root) => (root.join(format!("mashup-{}", run_id)), None),
            None => {
                let tempdir = tempfile::Builder::new().prefix("mashup-").tempdir()?;
                (tempdir.path().to_path_buf(), Some(tempdir))
            }
        };
        create_stage_dirs(&base)?;
        info!("Provisioned workspace: {}", base.display());
        Ok(Self { run_id, base, tempdir })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn path(&self) -> &Path {
        &self.base
    }

    pub fn videos(&self) -> PathBuf {
        self.base.join(VIDEO_DIR)
    }

    pub fn audio(&self) -> PathBuf {
        self.base.join(AUDIO_DIR)
    }

    pub fn trimmed(&self) -> PathBuf {
        self.base.join(TRIMMED_DIR)
    }

    /// Keep the workspace on disk after drop, for debugging a run
    pub fn keep(&mut self) {
        if let Some(tempdir) = self.tempdir.take() {
            // Skip the TempDir destructor so the tree stays on disk
            std::mem::forget(tempdir);
            debug!("Keeping workspace: {}", self.base.display());
        }
    }
}

/// Create the stage directories and any missing parents. Calling this on
/// an existing tree is a no-op.
fn create_stage_dirs(base: &Path) -> std::io::Result<()> {
    for dir in [VIDEO_DIR, AUDIO_DIR, TRIMMED_DIR] {
        fs::create_dir_all(base.join(dir))?;
    }
    Ok(())
}

/// List the regular files in `dir` whose extension matches one of `exts`
/// (case-insensitive), sorted by file name.
pub fn files_with_extension(dir: &Path, exts: &[&str]) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| exts.iter().any(|e| ext.eq_ignore_ascii_case(e)))
            .unwrap_or(false);
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn provision_creates_stage_dirs() {
        let root = tempfile::tempdir().unwrap();
        let workspace = RunWorkspace::provision(Some(root.path())).unwrap();
        assert!(workspace.videos().is_dir());
        assert!(workspace.audio().is_dir());
        assert!(workspace.trimmed().is_dir());
    }

    #[test]
    fn provision_under_root_is_unique_per_run() {
        let root = tempfile::tempdir().unwrap();
        let first = RunWorkspace::provision(Some(root.path())).unwrap();
        let second = RunWorkspace::provision(Some(root.path())).unwrap();
        assert_ne!(first.path(), second.path());
    }

    #[test]
    fn create_stage_dirs_is_idempotent() {
        let root = tempfile::tempdir().unwrap();
        let base = root.path().join("run");
        create_stage_dirs(&base).unwrap();
        create_stage_dirs(&base).unwrap();
        assert!(base.join(VIDEO_DIR).is_dir());
    }

    #[test]
    fn temp_workspace_is_removed_on_drop() {
        let path = {
            let workspace = RunWorkspace::provision(None).unwrap();
            workspace.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn kept_workspace_survives_drop() {
        let path = {
            let mut workspace = RunWorkspace::provision(None).unwrap();
            workspace.keep();
            workspace.path().to_path_buf()
        };
        assert!(path.exists());
        fs::remove_dir_all(path).unwrap();
    }

    #[test]
    fn files_with_extension_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("b.wav"));
        touch(&dir.path().join("a.wav"));
        touch(&dir.path().join("c.WAV"));
        touch(&dir.path().join("notes.txt"));
        touch(&dir.path().join("noext"));

        let files = files_with_extension(dir.path(), &["wav"]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.wav", "b.wav", "c.WAV"]);
    }

    #[test]
    fn files_with_extension_ignores_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("clip.wav")).unwrap();
        touch(&dir.path().join("real.wav"));

        let files = files_with_extension(dir.path(), &["wav"]).unwrap();
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("real.wav"));
    }
}
