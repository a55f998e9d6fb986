//! Environment resolution for task commands

use crate::task::Task;

/// Variable exported to every command with the running task's name
pub const TASK_ENV_VAR: &str = "GANTRY_TASK";

/// Environment bindings for commands run on behalf of `task`.
///
/// Bindings come in key order and are layered on top of the inherited
/// process environment by the command runner.
pub fn get(task: &Task) -> Vec<(String, String)> {
    let mut bindings: Vec<(String, String)> = task
        .env
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    bindings.push((TASK_ENV_VAR.to_string(), task.task.clone()));
    bindings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_appends_task_name() {
        let task = Task::new("build")
            .with_env("PROFILE", "release")
            .with_env("CC", "clang");

        let env = get(&task);
        assert_eq!(
            env,
            vec![
                ("CC".to_string(), "clang".to_string()),
                ("PROFILE".to_string(), "release".to_string()),
                (TASK_ENV_VAR.to_string(), "build".to_string()),
            ]
        );
    }

    #[test]
    fn test_get_empty_env() {
        let env = get(&Task::new("noop"));
        assert_eq!(env.len(), 1);
        assert_eq!(env[0].0, TASK_ENV_VAR);
    }
}
