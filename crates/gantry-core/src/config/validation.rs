//! Taskfile validation

use tracing::debug;

use crate::error::{ConfigError, Result};

use super::types::{CmdConfig, OutputConfig, TaskfileConfig};

/// Output style names accepted in `output:`
pub const OUTPUT_STYLES: [&str; 3] = ["interleaved", "group", "prefixed"];

/// Validate a parsed taskfile
pub fn validate_config(config: &TaskfileConfig) -> Result<()> {
    debug!(tasks = config.tasks.len(), "validating taskfile");
    validate_output(config)?;
    validate_task_names(config)?;
    validate_references(config)?;
    debug!("taskfile validation passed");
    Ok(())
}

fn validate_output(config: &TaskfileConfig) -> Result<()> {
    if let OutputConfig::Named(name) = &config.output {
        if !OUTPUT_STYLES.contains(&name.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "output".to_string(),
                message: format!("must be one of: {}", OUTPUT_STYLES.join(", ")),
            }
            .into());
        }
    }
    Ok(())
}

fn validate_task_names(config: &TaskfileConfig) -> Result<()> {
    for name in config.tasks.keys() {
        if name.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "tasks".to_string(),
                message: "task name cannot be empty".to_string(),
            }
            .into());
        }
        if name.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: format!("tasks.{}", name),
                message: "task name cannot contain whitespace".to_string(),
            }
            .into());
        }
    }
    Ok(())
}

fn validate_references(config: &TaskfileConfig) -> Result<()> {
    let defined = |name: &str| {
        config.tasks.contains_key(name)
            || config.tasks.values().any(|t| t.aliases.iter().any(|a| a == name))
    };

    for (name, task) in &config.tasks {
        for (idx, cmd) in task.cmds.iter().enumerate() {
            match cmd {
                CmdConfig::Shell(cmd) | CmdConfig::Command { cmd } if cmd.trim().is_empty() => {
                    return Err(ConfigError::InvalidValue {
                        field: format!("tasks.{}.cmds[{}]", name, idx),
                        message: "command cannot be empty".to_string(),
                    }
                    .into());
                }
                CmdConfig::Task { task: target } if !defined(target) => {
                    return Err(ConfigError::UnknownTask {
                        from: name.clone(),
                        target: target.clone(),
                    }
                    .into());
                }
                _ => {}
            }
        }

        for dep in &task.deps {
            if !defined(dep.task()) {
                return Err(ConfigError::UnknownTask {
                    from: name.clone(),
                    target: dep.task().to_string(),
                }
                .into());
            }
        }
    }
    Ok(())
}
