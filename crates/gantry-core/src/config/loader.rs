//! Taskfile loading

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{ConfigError, Result};

use super::defaults::{taskfile_names, DEFAULT_TEMP_DIR, TEMP_DIR_ENV};
use super::types::{Taskfile, TaskfileConfig};
use super::validation::validate_config;

/// Load a taskfile from a path
pub fn load_taskfile(path: &Path) -> Result<Taskfile> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading taskfile");

    let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

    let config: TaskfileConfig = if format == "TOML" {
        toml::from_str(&content).map_err(ConfigError::TomlError)?
    } else if content.trim().is_empty() {
        TaskfileConfig::default()
    } else {
        serde_yaml::from_str(&content).map_err(ConfigError::YamlError)?
    };

    validate_config(&config)?;

    let tasks = config.to_tasks(path, &content);
    debug!(path = %path.display(), tasks = tasks.len(), "taskfile loaded and validated");

    Ok(Taskfile {
        location: path.to_path_buf(),
        config,
        tasks,
    })
}

/// Find a taskfile in a directory or its parents.
///
/// Names are tried in [`taskfile_names`] order at each level; the first
/// match wins. Parents are walked until the filesystem root.
pub fn find_taskfile(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for taskfile");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in taskfile_names() {
            let candidate = current.join(name);
            if candidate.is_file() {
                info!(path = %candidate.display(), "found taskfile");
                return Some(candidate);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no taskfile found");
    None
}

/// Load the taskfile governing `dir` (searching parent directories)
pub fn load_taskfile_from_dir(dir: &Path) -> Result<Taskfile> {
    let path = find_taskfile(dir).ok_or_else(|| ConfigError::NotFound(dir.to_path_buf()))?;
    load_taskfile(&path)
}

/// Directory holding fingerprint state for a taskfile.
///
/// `GANTRY_TEMP_DIR` wins when set; relative values are taken relative to
/// the taskfile's directory.
pub fn temp_dir_for(taskfile: &Taskfile) -> PathBuf {
    resolve_temp_dir(taskfile.dir(), std::env::var(TEMP_DIR_ENV).ok())
}

fn resolve_temp_dir(base: &Path, env_value: Option<String>) -> PathBuf {
    match env_value.filter(|v| !v.is_empty()) {
        Some(value) => {
            let path = PathBuf::from(value);
            if path.is_absolute() {
                path
            } else {
                base.join(path)
            }
        }
        None => base.join(DEFAULT_TEMP_DIR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_taskfile() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Gantryfile.yml");
        std::fs::write(&path, "tasks: {}").unwrap();

        assert_eq!(find_taskfile(temp.path()), Some(path));
    }

    #[test]
    fn test_find_taskfile_prefers_default_name() {
        let temp = TempDir::new().unwrap();
        let yml = temp.path().join("Gantryfile.yml");
        let toml = temp.path().join("gantry.toml");
        std::fs::write(&yml, "tasks: {}").unwrap();
        std::fs::write(&toml, "").unwrap();

        assert_eq!(find_taskfile(temp.path()).unwrap(), yml);
    }

    #[test]
    fn test_find_taskfile_in_parent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gantry.yml");
        std::fs::write(&path, "tasks: {}").unwrap();
        let nested = temp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_taskfile(&nested), Some(path));
    }

    #[test]
    fn test_load_taskfile_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Gantryfile.yml");
        std::fs::write(
            &path,
            "tasks:\n  build:\n    desc: Build\n    cmds:\n      - echo build\n  test:\n    deps: [build]\n    status:\n      - test -f out\n",
        )
        .unwrap();

        let taskfile = load_taskfile(&path).unwrap();
        assert_eq!(taskfile.tasks.len(), 2);
        let test = taskfile.get("test").unwrap();
        assert_eq!(test.deps[0].task, "build");
        assert_eq!(test.status, vec!["test -f out"]);
        assert_eq!(test.location.taskfile, path);
    }

    #[test]
    fn test_load_taskfile_toml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("gantry.toml");
        std::fs::write(
            &path,
            "method = \"timestamp\"\n\n[tasks.build]\ndesc = \"Build\"\ncmds = [\"make\"]\n",
        )
        .unwrap();

        let taskfile = load_taskfile(&path).unwrap();
        let build = taskfile.get("build").unwrap();
        assert_eq!(build.method, crate::task::FingerprintMethod::Timestamp);
        assert_eq!(build.location.line, 3);
    }

    #[test]
    fn test_load_taskfile_invalid_reference() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("Gantryfile.yml");
        std::fs::write(&path, "tasks:\n  build:\n    deps: [missing]\n").unwrap();

        assert!(load_taskfile(&path).is_err());
    }

    #[test]
    fn test_resolve_temp_dir() {
        let base = Path::new("/work");
        assert_eq!(resolve_temp_dir(base, None), PathBuf::from("/work/.gantry"));
        assert_eq!(
            resolve_temp_dir(base, Some("state".to_string())),
            PathBuf::from("/work/state")
        );
        assert_eq!(
            resolve_temp_dir(base, Some("/tmp/fp".to_string())),
            PathBuf::from("/tmp/fp")
        );
        assert_eq!(
            resolve_temp_dir(base, Some(String::new())),
            PathBuf::from("/work/.gantry")
        );
    }
}
