//! Task types and definitions
//!
//! A [`Task`] is the read-only, fully resolved form of a task declared in a
//! taskfile. Everything downstream (fingerprinting, listing, output) consumes
//! tasks by reference and never mutates them.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How a task decides whether its previous output is still valid
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FingerprintMethod {
    /// Never up to date
    None,
    /// Content hash of the declared sources
    #[default]
    Checksum,
    /// Modification times of sources against generated files
    Timestamp,
    /// Status probe commands only
    Status,
}

impl FingerprintMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Checksum => "checksum",
            Self::Timestamp => "timestamp",
            Self::Status => "status",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(Self::None),
            "checksum" => Some(Self::Checksum),
            "timestamp" => Some(Self::Timestamp),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

impl fmt::Display for FingerprintMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How often a task may run within one invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPolicy {
    /// Run every time it is called
    #[default]
    Always,
    /// Run at most once per invocation
    Once,
    /// Run again only when the task's content changed
    WhenChanged,
}

/// A single entry in a task's command list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cmd {
    /// Shell command to execute
    Command(String),
    /// Call another task
    Task(String),
}

/// Reference to a task that must run first
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dep {
    pub task: String,
}

/// Where a task was declared
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Taskfile path
    pub taskfile: PathBuf,
    /// 1-based line of the task's key
    pub line: usize,
    /// 1-based column of the task's key
    pub column: usize,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.taskfile.display(), self.line, self.column)
    }
}

/// A fully resolved task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Qualified task name
    pub task: String,
    /// Name within the defining taskfile
    pub local_name: String,
    /// Display label overriding the name
    pub label: Option<String>,
    pub desc: String,
    pub summary: String,
    pub aliases: Vec<String>,
    pub cmds: Vec<Cmd>,
    pub deps: Vec<Dep>,
    /// Status probe commands
    pub status: Vec<String>,
    /// Input globs
    pub sources: Vec<String>,
    /// Output globs
    pub generates: Vec<String>,
    /// Working directory
    pub dir: PathBuf,
    pub env: BTreeMap<String, String>,
    pub vars: BTreeMap<String, String>,
    pub method: FingerprintMethod,
    pub run: RunPolicy,
    /// Hidden from listings
    pub internal: bool,
    pub location: Location,
}

impl Task {
    /// Create a task with the given name and no content
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            task: name.clone(),
            local_name: name,
            label: None,
            desc: String::new(),
            summary: String::new(),
            aliases: Vec::new(),
            cmds: Vec::new(),
            deps: Vec::new(),
            status: Vec::new(),
            sources: Vec::new(),
            generates: Vec::new(),
            dir: PathBuf::new(),
            env: BTreeMap::new(),
            vars: BTreeMap::new(),
            method: FingerprintMethod::default(),
            run: RunPolicy::default(),
            internal: false,
            location: Location::default(),
        }
    }

    /// Display name: the label if set, otherwise the qualified name
    pub fn name(&self) -> &str {
        match &self.label {
            Some(label) if !label.is_empty() => label,
            _ => &self.task,
        }
    }

    /// Name within the defining taskfile
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Whether `name` refers to this task by name or alias
    pub fn matches(&self, name: &str) -> bool {
        self.task == name || self.aliases.iter().any(|a| a == name)
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = desc.into();
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Append a shell command
    pub fn with_cmd(mut self, cmd: impl Into<String>) -> Self {
        self.cmds.push(Cmd::Command(cmd.into()));
        self
    }

    /// Append a call to another task
    pub fn with_task_cmd(mut self, task: impl Into<String>) -> Self {
        self.cmds.push(Cmd::Task(task.into()));
        self
    }

    pub fn with_dep(mut self, task: impl Into<String>) -> Self {
        self.deps.push(Dep { task: task.into() });
        self
    }

    /// Append a status probe command
    pub fn with_status(mut self, cmd: impl Into<String>) -> Self {
        self.status.push(cmd.into());
        self
    }

    pub fn with_sources(mut self, sources: Vec<String>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_generates(mut self, generates: Vec<String>) -> Self {
        self.generates = generates;
        self
    }

    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_method(mut self, method: FingerprintMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_run(mut self, run: RunPolicy) -> Self {
        self.run = run;
        self
    }

    pub fn with_internal(mut self, internal: bool) -> Self {
        self.internal = internal;
        self
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_name_prefers_label() {
        let mut task = Task::new("build");
        assert_eq!(task.name(), "build");

        task.label = Some("build:release".to_string());
        assert_eq!(task.name(), "build:release");

        task.label = Some(String::new());
        assert_eq!(task.name(), "build");
    }

    #[test]
    fn test_task_matches_alias() {
        let task = Task::new("build").with_alias("b");
        assert!(task.matches("build"));
        assert!(task.matches("b"));
        assert!(!task.matches("test"));
    }

    #[test]
    fn test_task_builder() {
        let task = Task::new("lint")
            .with_cmd("cargo clippy")
            .with_task_cmd("fmt")
            .with_dep("setup")
            .with_status("test -f lint.ok")
            .with_method(FingerprintMethod::Timestamp);

        assert_eq!(task.cmds.len(), 2);
        assert_eq!(task.cmds[0], Cmd::Command("cargo clippy".into()));
        assert_eq!(task.cmds[1], Cmd::Task("fmt".into()));
        assert_eq!(task.deps[0].task, "setup");
        assert_eq!(task.status, vec!["test -f lint.ok"]);
        assert_eq!(task.method, FingerprintMethod::Timestamp);
    }

    #[test]
    fn test_fingerprint_method_parse() {
        assert_eq!(FingerprintMethod::parse("none"), Some(FingerprintMethod::None));
        assert_eq!(
            FingerprintMethod::parse("Checksum"),
            Some(FingerprintMethod::Checksum)
        );
        assert_eq!(FingerprintMethod::parse("md5"), None);
        assert_eq!(FingerprintMethod::Timestamp.to_string(), "timestamp");
    }

    #[test]
    fn test_location_display() {
        let location = Location {
            taskfile: PathBuf::from("Gantryfile.yml"),
            line: 4,
            column: 3,
        };
        assert_eq!(location.to_string(), "Gantryfile.yml:4:3");
    }
}
