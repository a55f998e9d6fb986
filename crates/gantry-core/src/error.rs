//! Error types for Gantry

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using GantryError
pub type Result<T> = std::result::Result<T, GantryError>;

/// Main error type for Gantry operations
#[derive(Debug, Error)]
pub enum GantryError {
    /// Taskfile-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Template resolution errors
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// Taskfile-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Taskfile not found
    #[error("No taskfile found in {0} or any parent directory")]
    NotFound(PathBuf),

    /// Invalid configuration value
    #[error("Invalid taskfile: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// A command or dependency references an undefined task
    #[error("Task '{from}' references undefined task '{target}'")]
    UnknownTask { from: String, target: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// IO error
    #[error("IO error reading taskfile: {0}")]
    Io(#[from] std::io::Error),
}

/// Template resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Template referenced a variable that is not defined
    #[error("Template references undefined variable '{0}'")]
    UnknownVariable(String),

    /// Template contains an action that could not be parsed
    #[error("Invalid template action near '{0}'")]
    InvalidAction(String),
}
