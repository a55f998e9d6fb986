//! Modification-time method

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use gantry_core::task::Task;

use crate::logger::Logger;

use super::{glob_files, remove_state, state_file_name, FingerprintError};

/// Up to date when no source is newer than the oldest generated file.
///
/// Tasks without `generates` are compared against a marker file kept in the
/// temp directory and refreshed on every non-dry evaluation.
pub struct TimestampChecker {
    temp_dir: PathBuf,
    dry: bool,
    logger: Arc<dyn Logger>,
}

impl TimestampChecker {
    pub fn new(temp_dir: impl Into<PathBuf>, dry: bool, logger: Arc<dyn Logger>) -> Self {
        Self {
            temp_dir: temp_dir.into(),
            dry,
            logger,
        }
    }

    pub fn is_up_to_date(&self, task: &Task) -> Result<bool, FingerprintError> {
        if task.sources.is_empty() {
            return Ok(false);
        }

        let sources = glob_files(&task.dir, &task.sources)?;
        let Some(newest_source) = newest(&sources)? else {
            return Ok(false);
        };

        if task.generates.is_empty() {
            return self.compare_with_marker(task, newest_source);
        }

        let generated = glob_files(&task.dir, &task.generates)?;
        let Some(oldest_generated) = oldest(&generated)? else {
            self.logger.verbose(&format!(
                "task: no generated files found for task \"{}\"",
                task.task
            ));
            return Ok(false);
        };

        Ok(newest_source <= oldest_generated)
    }

    fn compare_with_marker(
        &self,
        task: &Task,
        newest_source: SystemTime,
    ) -> Result<bool, FingerprintError> {
        let marker = self.marker_path(task);
        let reference = fs::metadata(&marker).and_then(|m| m.modified()).ok();

        if !self.dry {
            if let Some(parent) = marker.parent() {
                fs::create_dir_all(parent).map_err(|source| FingerprintError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&marker, format!("{}\n", chrono::Utc::now().to_rfc3339())).map_err(
                |source| FingerprintError::Io {
                    path: marker.clone(),
                    source,
                },
            )?;
        }

        Ok(reference.is_some_and(|reference| newest_source <= reference))
    }

    /// Drop the marker file written for `task`
    pub fn reset(&self, task: &Task) -> Result<(), FingerprintError> {
        if self.dry {
            return Ok(());
        }
        remove_state(&self.marker_path(task))
    }

    fn marker_path(&self, task: &Task) -> PathBuf {
        self.temp_dir.join("timestamp").join(state_file_name(task))
    }
}

fn modified(path: &Path) -> Result<SystemTime, FingerprintError> {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .map_err(|source| FingerprintError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn newest<'a>(
    paths: impl IntoIterator<Item = &'a PathBuf>,
) -> Result<Option<SystemTime>, FingerprintError> {
    let mut newest = None;
    for path in paths {
        let time = modified(path)?;
        newest = Some(newest.map_or(time, |n: SystemTime| n.max(time)));
    }
    Ok(newest)
}

fn oldest<'a>(
    paths: impl IntoIterator<Item = &'a PathBuf>,
) -> Result<Option<SystemTime>, FingerprintError> {
    let mut oldest = None;
    for path in paths {
        let time = modified(path)?;
        oldest = Some(oldest.map_or(time, |o: SystemTime| o.min(time)));
    }
    Ok(oldest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::NullLogger;
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn touch(path: &Path, age: Duration) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let file = File::create(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    fn checker(temp: &TempDir, dry: bool) -> TimestampChecker {
        TimestampChecker::new(temp.path().join(".gantry"), dry, Arc::new(NullLogger))
    }

    fn task(temp: &TempDir) -> Task {
        Task::new("build")
            .with_dir(temp.path())
            .with_sources(vec!["src/*.c".to_string()])
            .with_generates(vec!["out/*.o".to_string()])
    }

    #[test]
    fn test_generates_newer_than_sources() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("src/a.c"), Duration::from_secs(600));
        touch(&temp.path().join("out/a.o"), Duration::from_secs(60));

        assert!(checker(&temp, false).is_up_to_date(&task(&temp)).unwrap());
    }

    #[test]
    fn test_source_newer_than_generates() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("src/a.c"), Duration::from_secs(10));
        touch(&temp.path().join("out/a.o"), Duration::from_secs(600));

        assert!(!checker(&temp, false).is_up_to_date(&task(&temp)).unwrap());
    }

    #[test]
    fn test_missing_generates_is_stale() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("src/a.c"), Duration::from_secs(600));

        assert!(!checker(&temp, false).is_up_to_date(&task(&temp)).unwrap());
    }

    #[test]
    fn test_no_sources_is_stale() {
        let temp = TempDir::new().unwrap();
        let task = Task::new("build").with_dir(temp.path());
        assert!(!checker(&temp, false).is_up_to_date(&task).unwrap());
    }

    #[test]
    fn test_marker_without_generates() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("src/a.c"), Duration::from_secs(600));
        let task = Task::new("build")
            .with_dir(temp.path())
            .with_sources(vec!["src/*.c".to_string()]);
        let checker = checker(&temp, false);

        // first evaluation has no marker to compare against
        assert!(!checker.is_up_to_date(&task).unwrap());
        assert!(checker.is_up_to_date(&task).unwrap());

        touch(&temp.path().join("src/a.c"), Duration::ZERO);
        let marker = checker.marker_path(&task);
        File::options()
            .write(true)
            .open(&marker)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(60))
            .unwrap();
        assert!(!checker.is_up_to_date(&task).unwrap());
    }

    #[test]
    fn test_dry_run_leaves_no_marker() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("src/a.c"), Duration::from_secs(600));
        let task = Task::new("build")
            .with_dir(temp.path())
            .with_sources(vec!["src/*.c".to_string()]);
        let checker = checker(&temp, true);

        assert!(!checker.is_up_to_date(&task).unwrap());
        assert!(!checker.is_up_to_date(&task).unwrap());
        assert!(!temp.path().join(".gantry").exists());
    }
}
