//! Task identity keys
//!
//! A [`HashStrategy`] turns a task into an opaque identity string. The
//! string is used to decide whether two calls refer to "the same" task run:
//! by nothing at all, by name, or by full content.

use sha2::{Digest, Sha256};

use gantry_core::task::{RunPolicy, Task};

/// Hashing errors
#[derive(Debug, thiserror::Error)]
pub enum HashError {
    /// The task could not be serialised for hashing
    #[error("failed to serialise task '{task}' for hashing: {source}")]
    Serialize {
        task: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Strategy used to derive a task's identity key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashStrategy {
    /// Always `""`; disables identity tracking
    Empty,
    /// `<taskfile>:<local name>`
    Name,
    /// `<task>:<hash of every task field>`
    Structural,
}

impl HashStrategy {
    /// Strategy matching a task's run policy
    pub fn for_run_policy(run: RunPolicy) -> Self {
        match run {
            RunPolicy::Always => Self::Empty,
            RunPolicy::Once => Self::Name,
            RunPolicy::WhenChanged => Self::Structural,
        }
    }

    /// Compute the identity key for `task`
    pub fn hash(&self, task: &Task) -> Result<String, HashError> {
        match self {
            Self::Empty => empty(task),
            Self::Name => name(task),
            Self::Structural => structural(task),
        }
    }
}

/// Empty identity
pub fn empty(_task: &Task) -> Result<String, HashError> {
    Ok(String::new())
}

/// Identity by defining file and local name
pub fn name(task: &Task) -> Result<String, HashError> {
    Ok(format!(
        "{}:{}",
        task.location.taskfile.display(),
        task.local_name()
    ))
}

/// Identity by content.
///
/// The task is serialised to canonical JSON (struct fields in declaration
/// order, maps sorted, sequences in order) and hashed with SHA-256, so any
/// field change, including reordering commands, changes the key.
pub fn structural(task: &Task) -> Result<String, HashError> {
    let bytes = serde_json::to_vec(task).map_err(|source| HashError::Serialize {
        task: task.task.clone(),
        source,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{}:{:x}", task.task, hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::path::PathBuf;

    use gantry_core::task::{FingerprintMethod, Location};

    fn sample() -> Task {
        Task::new("build")
            .with_desc("Build the project")
            .with_summary("Longer text")
            .with_alias("b")
            .with_cmd("cargo build")
            .with_cmd("cargo doc")
            .with_dep("setup")
            .with_status("test -f target/done")
            .with_sources(vec!["src/**/*.rs".to_string()])
            .with_generates(vec!["target/app".to_string()])
            .with_dir("/work")
            .with_env("PROFILE", "release")
            .with_location(Location {
                taskfile: PathBuf::from("/work/Gantryfile.yml"),
                line: 3,
                column: 3,
            })
    }

    #[test]
    fn test_empty_always_blank() {
        assert_eq!(empty(&sample()).unwrap(), "");
        assert_eq!(empty(&Task::new("")).unwrap(), "");
        assert_eq!(HashStrategy::Empty.hash(&sample()).unwrap(), "");
    }

    #[test]
    fn test_name_uses_taskfile_and_local_name() {
        let mut task = sample();
        task.task = "ns:build".to_string();
        assert_eq!(name(&task).unwrap(), "/work/Gantryfile.yml:build");

        // content edits don't change the name identity
        let edited = task.clone().with_cmd("cargo test");
        assert_eq!(name(&task).unwrap(), name(&edited).unwrap());
    }

    #[test]
    fn test_structural_deterministic() {
        let task = sample();
        let first = structural(&task).unwrap();
        let second = structural(&task.clone()).unwrap();
        assert_eq!(first, second);
        assert!(first.starts_with("build:"));
        assert_eq!(first.len(), "build:".len() + 64);
    }

    #[test]
    fn test_structural_order_sensitive() {
        let mut reordered = sample();
        reordered.cmds.reverse();
        assert_ne!(structural(&sample()).unwrap(), structural(&reordered).unwrap());
    }

    fn mutated(base: &Task, mutate: impl FnOnce(&mut Task)) -> Task {
        let mut task = base.clone();
        mutate(&mut task);
        task
    }

    #[test]
    fn test_structural_changes_with_any_field() {
        let base = sample();
        let variants = vec![
            ("task", mutated(&base, |t| t.task = "build2".into())),
            ("local_name", mutated(&base, |t| t.local_name = "other".into())),
            ("label", mutated(&base, |t| t.label = Some("label".into()))),
            ("desc", mutated(&base, |t| t.desc.push('!'))),
            ("summary", mutated(&base, |t| t.summary.push('!'))),
            ("aliases", mutated(&base, |t| t.aliases.push("bb".into()))),
            ("cmds", mutated(&base, |t| {
                t.cmds.pop();
            })),
            ("deps", mutated(&base, |t| t.deps.clear())),
            ("status", mutated(&base, |t| t.status.push("true".into()))),
            ("sources", mutated(&base, |t| t.sources.push("Cargo.toml".into()))),
            ("generates", mutated(&base, |t| t.generates.clear())),
            ("dir", mutated(&base, |t| t.dir = PathBuf::from("/elsewhere"))),
            ("env", mutated(&base, |t| {
                t.env.insert("PROFILE".into(), "debug".into());
            })),
            ("vars", mutated(&base, |t| {
                t.vars.insert("X".into(), "1".into());
            })),
            ("method", mutated(&base, |t| t.method = FingerprintMethod::Timestamp)),
            ("run", mutated(&base, |t| t.run = RunPolicy::Once)),
            ("internal", mutated(&base, |t| t.internal = true)),
            ("location", mutated(&base, |t| t.location.line += 1)),
        ];

        let mut seen = HashSet::new();
        seen.insert(structural(&base).unwrap());

        for (field, task) in &variants {
            assert_ne!(task, &base, "mutation of {} had no effect", field);
            let key = structural(task).unwrap();
            assert!(seen.insert(key), "hash collision after changing {}", field);
        }
    }

    #[test]
    fn test_for_run_policy() {
        assert_eq!(HashStrategy::for_run_policy(RunPolicy::Always), HashStrategy::Empty);
        assert_eq!(HashStrategy::for_run_policy(RunPolicy::Once), HashStrategy::Name);
        assert_eq!(
            HashStrategy::for_run_policy(RunPolicy::WhenChanged),
            HashStrategy::Structural
        );
    }
}
