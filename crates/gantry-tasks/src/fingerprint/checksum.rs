//! Content checksum method

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tracing::debug;

use gantry_core::task::Task;

use crate::logger::Logger;

use super::{glob_files, remove_state, state_file_name, FingerprintError};

/// Up to date when the sources hash to the checksum stored by the last
/// evaluation and every generated pattern matches something
pub struct ChecksumChecker {
    temp_dir: PathBuf,
    dry: bool,
    logger: Arc<dyn Logger>,
}

impl ChecksumChecker {
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

        let checksum_file = self.checksum_path(task);
        let previous = self.value(task);
        let current = self.checksum(task)?;

        if previous.as_deref() != Some(current.as_str()) && !self.dry {
            if let Some(parent) = checksum_file.parent() {
                fs::create_dir_all(parent).map_err(|source| FingerprintError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            fs::write(&checksum_file, format!("{}\n", current)).map_err(|source| {
                FingerprintError::Io {
                    path: checksum_file.clone(),
                    source,
                }
            })?;
            debug!(task = %task.task, path = %checksum_file.display(), "stored checksum");
        }

        for pattern in &task.generates {
            if glob_files(&task.dir, std::slice::from_ref(pattern))?.is_empty() {
                self.logger.verbose(&format!(
                    "task: generated file pattern {} for task \"{}\" matched nothing",
                    pattern, task.task
                ));
                return Ok(false);
            }
        }

        let up_to_date = previous.as_deref() == Some(current.as_str());
        self.logger.verbose(&format!(
            "task: checksum of \"{}\" is {}",
            task.task,
            if up_to_date { "unchanged" } else { "changed" }
        ));
        Ok(up_to_date)
    }

    /// SHA-256 over the relative path and content of every source file
    pub fn checksum(&self, task: &Task) -> Result<String, FingerprintError> {
        let files = glob_files(&task.dir, &task.sources)?;
        let mut hasher = Sha256::new();

        for path in &files {
            let contents = fs::read(path).map_err(|source| FingerprintError::Io {
                path: path.clone(),
                source,
            })?;
            let relative = path.strip_prefix(&task.dir).unwrap_or(path);

            let mut file_hasher = Sha256::new();
            file_hasher.update(&contents);

            hasher.update(relative.to_string_lossy().as_bytes());
            hasher.update(b"\0");
            hasher.update(file_hasher.finalize());
        }

        Ok(format!("{:x}", hasher.finalize()))
    }

    /// Checksum stored by the previous evaluation, if any
    pub fn value(&self, task: &Task) -> Option<String> {
        fs::read_to_string(self.checksum_path(task))
            .ok()
            .map(|s| s.trim().to_string())
    }

    /// Forget the stored checksum so the next evaluation reports stale
    pub fn reset(&self, task: &Task) -> Result<(), FingerprintError> {
        if self.dry {
            return Ok(());
        }
        remove_state(&self.checksum_path(task))
    }

    fn checksum_path(&self, task: &Task) -> PathBuf {
        self.temp_dir.join("checksum").join(state_file_name(task))
    }
}
