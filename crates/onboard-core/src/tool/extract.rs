//! Typed value extraction from tool output.

use regex::Regex;
use serde_json::Value;

/// A named rule for pulling a single value out of stdout.
#[derive(Debug, Clone)]
pub enum OutputPattern {
    /// First capture group of a regex matched against human-readable output.
    Line { name: String, regex: Regex },
    /// Scalar at a JSON pointer, with stdout parsed as one JSON document.
    Json { name: String, pointer: String },
}

impl OutputPattern {
    /// Build a regex pattern. The expression must have one capture group.
    ///
    /// Panics on an invalid expression; patterns are compile-time constants.
    pub fn line(name: impl Into<String>, pattern: &str) -> Self {
        let regex = Regex::new(pattern).expect("output pattern must be a valid regex");
        debug_assert!(regex.captures_len() >= 2, "pattern needs a capture group");
        OutputPattern::Line {
            name: name.into(),
            regex,
        }
    }

    pub fn json(name: impl Into<String>, pointer: impl Into<String>) -> Self {
        OutputPattern::Json {
            name: name.into(),
            pointer: pointer.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            OutputPattern::Line { name, .. } | OutputPattern::Json { name, .. } => name,
        }
    }

    /// Find the value in `stdout`, or `None` when the output has another shape.
    pub fn apply(&self, stdout: &str) -> Option<String> {
        match self {
            OutputPattern::Line { regex, .. } => regex
                .captures(stdout)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string()),
            OutputPattern::Json { pointer, .. } => {
                let document: Value = serde_json::from_str(stdout.trim()).ok()?;
                scalar_to_string(document.pointer(pointer)?)
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
