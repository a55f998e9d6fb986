//! Gantry Core - task model and taskfile loading
//!
//! This crate provides the read-only [`Task`] model, taskfile discovery and
//! validation, environment resolution and `{{.VAR}}` templating used by the
//! fingerprinting and output engine in `gantry-tasks`.

pub mod config;
pub mod env;
pub mod error;
pub mod task;
pub mod templater;

pub use config::{load_taskfile, load_taskfile_from_dir, Taskfile, TaskfileConfig};
pub use error::{ConfigError, GantryError, Result, TemplateError};
pub use task::{Cmd, Dep, FingerprintMethod, Location, RunPolicy, Task};
pub use templater::{TemplateCache, Templater};
