//! Exit codes for the CLI

use gantry_core::GantryError;
use gantry_tasks::{ExecuteError, FingerprintError};

use crate::cli::commands::StaleTasks;

/// General error, or a stale task reported by `gantry status`
pub const ERROR: i32 = 1;

/// Taskfile missing or invalid
pub const CONFIG_ERROR: i32 = 2;

/// Up-to-date evaluation failed
pub const FINGERPRINT_ERROR: i32 = 3;

/// Exit code for an error returned by a command
pub fn for_error(err: &anyhow::Error) -> i32 {
    if err.downcast_ref::<StaleTasks>().is_some() {
        return ERROR;
    }
    if let Some(GantryError::Config(_)) = err.downcast_ref::<GantryError>() {
        return CONFIG_ERROR;
    }
    if err.downcast_ref::<FingerprintError>().is_some()
        || matches!(
            err.downcast_ref::<ExecuteError>(),
            Some(ExecuteError::Fingerprint(_))
        )
    {
        return FINGERPRINT_ERROR;
    }
    ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use gantry_core::ConfigError;

    #[test]
    fn test_config_errors() {
        let err = anyhow::Error::new(GantryError::from(ConfigError::NotFound("/tmp".into())));
        assert_eq!(for_error(&err), CONFIG_ERROR);
    }

    #[test]
    fn test_fingerprint_errors() {
        let err = anyhow::Error::new(FingerprintError::Join {
            task: "build".into(),
            message: "panicked".into(),
        });
        assert_eq!(for_error(&err.context("listing failed")), FINGERPRINT_ERROR);
    }

    #[test]
    fn test_stale_status() {
        let err = anyhow::Error::new(StaleTasks(vec!["build".into()]));
        assert_eq!(for_error(&err), ERROR);
    }

    #[test]
    fn test_other_errors() {
        assert_eq!(for_error(&anyhow::anyhow!("boom")), ERROR);
    }
}
