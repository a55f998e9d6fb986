//! Default configuration values

/// Default taskfile name
pub const DEFAULT_TASKFILE: &str = "Gantryfile.yml";

/// Directory, relative to the taskfile, holding fingerprint state
pub const DEFAULT_TEMP_DIR: &str = ".gantry";

/// Environment variable overriding the fingerprint temp directory
pub const TEMP_DIR_ENV: &str = "GANTRY_TEMP_DIR";

/// Get list of taskfile names to search for, in priority order
pub fn taskfile_names() -> Vec<&'static str> {
    vec![
        DEFAULT_TASKFILE,
        "Gantryfile.yaml",
        "gantry.yml",
        "gantry.yaml",
        "gantry.toml",
    ]
}

/// Starter taskfile written by `gantry init`
pub const DEFAULT_TASKFILE_TEMPLATE: &str = r#"# Gantry taskfile
version: '1'

method: checksum
output: interleaved

tasks:
  default:
    desc: Print a greeting
    cmds:
      - echo "hello from {{.TASK}}"
"#;
