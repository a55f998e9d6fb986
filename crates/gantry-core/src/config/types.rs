//! Taskfile configuration types

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::task::{Cmd, Dep, FingerprintMethod, Location, RunPolicy, Task};

/// Top-level taskfile document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskfileConfig {
    /// Schema version
    pub version: Option<String>,

    /// Default fingerprint method for tasks that don't set one
    pub method: FingerprintMethod,

    /// How concurrent task output is presented
    pub output: OutputConfig,

    /// Variables available to every task
    pub vars: BTreeMap<String, String>,

    /// Environment shared by every task
    pub env: BTreeMap<String, String>,

    /// Task declarations keyed by name
    pub tasks: BTreeMap<String, TaskConfig>,
}

/// Output style setting: a style name or a detailed group block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutputConfig {
    /// `interleaved`, `group` or `prefixed`
    Named(String),
    /// `group:` with begin/end markers
    Group { group: GroupConfig },
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::Named("interleaved".to_string())
    }
}

/// Detailed group output settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    /// Template printed before the task's output
    pub begin: Option<String>,
    /// Template printed after the task's output
    pub end: Option<String>,
    /// Only print output when the task fails
    pub error_only: bool,
}

/// A task declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskConfig {
    pub desc: String,
    pub summary: String,
    pub label: Option<String>,
    pub aliases: Vec<String>,
    pub cmds: Vec<CmdConfig>,
    pub deps: Vec<DepConfig>,
    /// Status probe commands
    pub status: Vec<String>,
    pub sources: Vec<String>,
    pub generates: Vec<String>,
    /// Working directory, relative to the taskfile
    pub dir: Option<PathBuf>,
    pub env: BTreeMap<String, String>,
    pub vars: BTreeMap<String, String>,
    /// Overrides the taskfile's method
    pub method: Option<FingerprintMethod>,
    pub run: RunPolicy,
    pub internal: bool,
}

/// A command entry: a bare string, `cmd:` or `task:`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CmdConfig {
    Shell(String),
    Command { cmd: String },
    Task { task: String },
}

impl From<&CmdConfig> for Cmd {
    fn from(config: &CmdConfig) -> Self {
        match config {
            CmdConfig::Shell(cmd) | CmdConfig::Command { cmd } => Cmd::Command(cmd.clone()),
            CmdConfig::Task { task } => Cmd::Task(task.clone()),
        }
    }
}

/// A dependency entry: a bare task name or `task:`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DepConfig {
    Name(String),
    Task { task: String },
}

impl DepConfig {
    pub fn task(&self) -> &str {
        match self {
            Self::Name(task) | Self::Task { task } => task,
        }
    }
}

/// A loaded taskfile and its resolved tasks
#[derive(Debug, Clone)]
pub struct Taskfile {
    /// Path of the taskfile
    pub location: PathBuf,
    /// Parsed document
    pub config: TaskfileConfig,
    /// Resolved tasks, ordered by name
    pub tasks: Vec<Task>,
}

impl Taskfile {
    /// Look up a task by name or alias
    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks
            .iter()
            .find(|t| t.task == name)
            .or_else(|| self.tasks.iter().find(|t| t.matches(name)))
    }

    /// Directory containing the taskfile
    pub fn dir(&self) -> &Path {
        self.location.parent().unwrap_or_else(|| Path::new("."))
    }
}

impl TaskfileConfig {
    /// Resolve every declaration into an immutable [`Task`].
    ///
    /// `source` is the raw taskfile text, used to find each task's line and
    /// column.
    pub fn to_tasks(&self, path: &Path, source: &str) -> Vec<Task> {
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        self.tasks
            .iter()
            .map(|(name, decl)| {
                let (line, column) = locate_task(source, name);

                let mut env = self.env.clone();
                env.extend(decl.env.iter().map(|(k, v)| (k.clone(), v.clone())));
                let mut vars = self.vars.clone();
                vars.extend(decl.vars.iter().map(|(k, v)| (k.clone(), v.clone())));

                let dir = match &decl.dir {
                    Some(dir) if dir.is_absolute() => dir.clone(),
                    Some(dir) => base_dir.join(dir),
                    None => base_dir.to_path_buf(),
                };

                Task {
                    task: name.clone(),
                    local_name: name.clone(),
                    label: decl.label.clone(),
                    desc: decl.desc.clone(),
                    summary: decl.summary.clone(),
                    aliases: decl.aliases.clone(),
                    cmds: decl.cmds.iter().map(Cmd::from).collect(),
                    deps: decl
                        .deps
                        .iter()
                        .map(|d| Dep {
                            task: d.task().to_string(),
                        })
                        .collect(),
                    status: decl.status.clone(),
                    sources: decl.sources.clone(),
                    generates: decl.generates.clone(),
                    dir,
                    env,
                    vars,
                    method: decl.method.unwrap_or(self.method),
                    run: decl.run,
                    internal: decl.internal,
                    location: Location {
                        taskfile: path.to_path_buf(),
                        line,
                        column,
                    },
                }
            })
            .collect()
    }
}

/// Find the 1-based line and column of a task's key in the taskfile text.
///
/// YAML keys only count at the first indentation level under the top-level
/// `tasks:` key. Falls back to `(1, 1)` when the key can't be found.
fn locate_task(source: &str, name: &str) -> (usize, usize) {
    let headers = [format!("[tasks.{}]", name), format!("[tasks.\"{}\"]", name)];
    let keys = [
        format!("{}:", name),
        format!("\"{}\":", name),
        format!("'{}':", name),
    ];

    let mut in_tasks = false;
    let mut task_indent = None;

    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let indent = line.len() - trimmed.len();

        if headers.iter().any(|header| trimmed.starts_with(header.as_str())) {
            return (idx + 1, indent + 1);
        }

        if indent == 0 {
            in_tasks = is_key(trimmed, "tasks:");
            task_indent = None;
            continue;
        }
        if !in_tasks {
            continue;
        }

        let level = *task_indent.get_or_insert(indent);
        if indent == level && keys.iter().any(|key| is_key(trimmed, key)) {
            return (idx + 1, indent + 1);
        }
    }

    (1, 1)
}

fn is_key(line: &str, key: &str) -> bool {
    line.strip_prefix(key)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}
