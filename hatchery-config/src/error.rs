//! Errors raised while loading or validating a `HatcheryConfig`.

use std::fmt::Write;
use std::path::PathBuf;

use thiserror::Error;
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// One line per rejected setting, prefixed with its section.
    #[error("Rejected settings:\n{}", describe_rejections(.0))]
    Validation(#[source] ValidationErrors),

    #[error("Configuration parsing error: {0}")]
    Parsing(#[from] figment::Error),

    #[error("Configuration I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ValidationErrors> for ConfigError {
    fn from(errors: ValidationErrors) -> Self {
        ConfigError::Validation(errors)
    }
}

/// Renders e.g. `  - [simulation] reading_interval_ms: range`.
fn describe_rejections(errors: &ValidationErrors) -> String {
    let mut lines = Vec::new();
    collect_rejections(errors, None, &mut lines);
    lines.sort();
    lines.iter().fold(String::new(), |mut out, line| {
        let _ = writeln!(out, "  - {line}");
        out
    })
}

fn collect_rejections(errors: &ValidationErrors, section: Option<&str>, lines: &mut Vec<String>) {
    for (name, kind) in errors.errors() {
        match kind {
            ValidationErrorsKind::Field(failures) => {
                let setting = match section {
                    Some(section) => format!("[{section}] {name}"),
                    None => name.to_string(),
                };
                for failure in failures {
                    let reason = failure
                        .message
                        .as_deref()
                        .unwrap_or_else(|| failure.code.as_ref());
                    lines.push(format!("{setting}: {reason}"));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                collect_rejections(inner, Some(name.as_ref()), lines)
            }
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    let nested = format!("{name}[{index}]");
                    collect_rejections(inner, Some(&nested), lines);
                }
            }
        }
    }
}
