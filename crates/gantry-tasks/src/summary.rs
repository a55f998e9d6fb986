//! Task summaries for `gantry summary`

use std::io::{self, Write};

use console::style;

use gantry_core::task::{Cmd, Task};
use gantry_core::Taskfile;

/// Print the summary of each named task, separated by blank lines.
///
/// Names that don't resolve to a task are skipped.
pub fn print_tasks<W: Write>(w: &mut W, taskfile: &Taskfile, names: &[String]) -> io::Result<()> {
    for (i, name) in names.iter().enumerate() {
        if i > 0 {
            write!(w, "\n\n")?;
        }
        if let Some(task) = taskfile.get(name) {
            print_task(w, task)?;
        }
    }
    Ok(())
}

pub fn print_task<W: Write>(w: &mut W, task: &Task) -> io::Result<()> {
    writeln!(w, "task: {}", style(task.name()).green())?;
    writeln!(w)?;

    if !task.summary.is_empty() {
        let lines: Vec<&str> = task.summary.split('\n').collect();
        for (i, line) in lines.iter().enumerate() {
            if i + 1 < lines.len() || !line.is_empty() {
                writeln!(w, "{}", line)?;
            }
        }
    } else if !task.desc.is_empty() {
        writeln!(w, "{}", task.desc)?;
    } else {
        writeln!(w, "(task does not have description or summary)")?;
    }

    if !task.deps.is_empty() {
        writeln!(w)?;
        writeln!(w, "dependencies:")?;
        for dep in &task.deps {
            writeln!(w, " - {}", dep.task)?;
        }
    }

    if !task.aliases.is_empty() {
        writeln!(w)?;
        writeln!(w, "aliases:")?;
        for alias in &task.aliases {
            writeln!(w, " - {}", style(alias).cyan())?;
        }
    }

    if !task.cmds.is_empty() {
        writeln!(w)?;
        writeln!(w, "commands:")?;
        for cmd in &task.cmds {
            match cmd {
                Cmd::Command(command) => writeln!(w, " - {}", style(command).yellow())?,
                Cmd::Task(name) => writeln!(w, " - {}", style(format!("Task: {}", name)).green())?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(task: &Task) -> String {
        console::set_colors_enabled(false);
        let mut out = Vec::new();
        print_task(&mut out, task).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_full_summary() {
        let task = Task::new("build")
            .with_desc("Build it")
            .with_summary("Builds the project.\n\nRuns cargo.\n")
            .with_dep("setup")
            .with_alias("b")
            .with_cmd("cargo build")
            .with_task_cmd("docs");

        assert_eq!(
            render(&task),
            "task: build\n\
             \n\
             Builds the project.\n\
             \n\
             Runs cargo.\n\
             \n\
             dependencies:\n - setup\n\
             \n\
             aliases:\n - b\n\
             \n\
             commands:\n - cargo build\n - Task: docs\n"
        );
    }

    #[test]
    fn test_description_fallback() {
        let text = render(&Task::new("fmt").with_desc("Format code"));
        assert_eq!(text, "task: fmt\n\nFormat code\n");
    }

    #[test]
    fn test_no_description() {
        let text = render(&Task::new("clean"));
        assert!(text.ends_with("(task does not have description or summary)\n"));
        assert!(!text.contains("commands:"));
    }

    #[test]
    fn test_print_tasks_separates_and_skips_unknown() {
        console::set_colors_enabled(false);
        let taskfile = Taskfile {
            location: "Gantryfile.yml".into(),
            config: Default::default(),
            tasks: vec![
                Task::new("build").with_desc("Build").with_alias("b"),
                Task::new("test").with_desc("Test"),
            ],
        };
        let names = vec!["b".to_string(), "missing".to_string(), "test".to_string()];

        let mut out = Vec::new();
        print_tasks(&mut out, &taskfile, &names).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.starts_with("task: build\n"));
        assert!(text.contains("Build\n\naliases:\n - b\n\n\n\n\ntask: test\n"));
    }
}
