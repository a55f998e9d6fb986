//! Variable substitution for `{{.NAME}}` template actions

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::TemplateError;
use crate::task::Task;

/// Resolves template strings against a set of variables
pub trait Templater: Send + Sync {
    /// Replace every template action in `template`
    fn replace(&self, template: &str) -> Result<String, TemplateError>;
}

fn action_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{\{\s*\.([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("valid template regex")
    })
}

/// Variable cache used to resolve templates for one task
#[derive(Debug, Clone, Default)]
pub struct TemplateCache {
    vars: BTreeMap<String, String>,
}

impl TemplateCache {
    pub fn new(vars: BTreeMap<String, String>) -> Self {
        Self { vars }
    }

    /// Cache seeded with a task's variables plus `TASK` and `TASKFILE`
    pub fn for_task(task: &Task) -> Self {
        let mut vars = task.vars.clone();
        vars.insert("TASK".to_string(), task.task.clone());
        vars.insert(
            "TASKFILE".to_string(),
            task.location.taskfile.display().to_string(),
        );
        Self { vars }
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

impl Templater for TemplateCache {
    fn replace(&self, template: &str) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(template.len());
        let mut last = 0;

        for caps in action_regex().captures_iter(template) {
            let Some(whole) = caps.get(0) else { continue };
            let literal = &template[last..whole.start()];
            check_literal(literal)?;
            out.push_str(literal);

            let name = &caps[1];
            let value = self
                .vars
                .get(name)
                .ok_or_else(|| TemplateError::UnknownVariable(name.to_string()))?;
            out.push_str(value);
            last = whole.end();
        }

        let tail = &template[last..];
        check_literal(tail)?;
        out.push_str(tail);
        Ok(out)
    }
}

// Literal text between actions must not open another action.
fn check_literal(literal: &str) -> Result<(), TemplateError> {
    match literal.find("{{") {
        Some(pos) => {
            let snippet: String = literal[pos..].chars().take(16).collect();
            Err(TemplateError::InvalidAction(snippet))
        }
        None => Ok(()),
    }
}
