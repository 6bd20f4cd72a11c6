//! Error handling for tmplkit.
//!
//! [`TmplkitError`] enumerates every failure the engine can raise, grouped
//! into three classes:
//!
//! - **Configuration errors** ([`TmplkitError::TemplateNotFound`],
//!   [`TmplkitError::EmptyValueMapping`], [`TmplkitError::InvalidValueKey`],
//!   [`TmplkitError::Config`]) are always fatal and raised before any output
//!   side effect.
//! - **Missing-variable errors** ([`TmplkitError::MissingVariables`]) are
//!   fatal only under the `fail` policy; the other policies downgrade them
//!   to warnings inside the pipeline.
//! - **Render errors** ([`TmplkitError::RenderFailed`]) wrap any back-end
//!   substitution failure uniformly so callers never have to match on
//!   back-end-specific error types.
//!
//! [`ErrorContext`] and [`user_friendly_error`] add colored display and
//! actionable suggestions for the CLI entry point. Nothing is ever
//! swallowed: every fatal condition carries the template path, output path,
//! or offending identifiers needed to diagnose without re-running.

use std::fmt;
use std::path::PathBuf;

use colored::Colorize;
use thiserror::Error;

use crate::templating::RenderError;

/// The main error type for tmplkit operations.
#[derive(Debug, Error)]
pub enum TmplkitError {
    /// The template file does not exist.
    #[error("Template file not found: {path}")]
    TemplateNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The caller supplied an empty value mapping for a template that
    /// references at least one variable. Always fatal, regardless of the
    /// configured missing-variable policy, since there is nothing to
    /// resolve against.
    #[error("No template values were provided for template {path}")]
    EmptyValueMapping {
        /// Template that required variables.
        path: PathBuf,
    },

    /// A value-mapping key is not a plain string. The legacy schema allowed
    /// composite (tuple) keys carrying auxiliary metadata; tmplkit rejects
    /// them at the boundary instead.
    #[error("Invalid value key {key}: {reason}")]
    InvalidValueKey {
        /// Display form of the offending key.
        key: String,
        /// Why the key was rejected.
        reason: String,
    },

    /// A general configuration problem (malformed values file, bad
    /// `--set` expression, unreadable input).
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem.
        message: String,
    },

    /// Template variables with no corresponding value under the `fail`
    /// policy. Nothing has been written to the output path.
    #[error("Template {} has unresolved variables: {}", template.display(), variables.join(", "))]
    MissingVariables {
        /// Template whose render was aborted.
        template: PathBuf,
        /// Every missing variable, in discovery order.
        variables: Vec<String>,
    },

    /// The substitution back end failed while rendering. No partial output
    /// is left at the destination.
    #[error("Failed to render {}", output.display())]
    RenderFailed {
        /// Output path the render was targeting.
        output: PathBuf,
        /// Structured back-end error.
        #[source]
        source: RenderError,
    },

    /// Underlying I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Wrapper that augments an error with a suggestion and optional details
/// for terminal display.
///
/// Created by [`user_friendly_error`]; the CLI calls [`ErrorContext::display`]
/// on fatal errors before exiting non-zero.
pub struct ErrorContext {
    error: anyhow::Error,
    suggestion: Option<String>,
    details: Option<String>,
}

impl ErrorContext {
    /// Wrap an error with no suggestion attached yet.
    pub fn new(error: anyhow::Error) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Attach an actionable suggestion shown below the error message.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach expanded details (multi-line context from the back end).
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{} {}", "Error:".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!();
            for line in details.lines() {
                eprintln!("  {line}");
            }
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!();
            eprintln!("{} {}", "Suggestion:".yellow().bold(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;
        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }
        Ok(())
    }
}

/// Convert any error into a user-friendly [`ErrorContext`] with a
/// suggestion matched to the failure class.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let (suggestion, details) = match error.downcast_ref::<TmplkitError>() {
        Some(TmplkitError::TemplateNotFound { .. }) => (
            Some("Check the template path; relative paths resolve against the current directory".to_string()),
            None,
        ),
        Some(TmplkitError::EmptyValueMapping { .. }) => (
            Some("Provide variables with --values <file.yaml> or --set KEY=VALUE".to_string()),
            None,
        ),
        Some(TmplkitError::InvalidValueKey { .. }) => (
            Some("Value-mapping keys must be plain strings; composite keys are not supported".to_string()),
            None,
        ),
        Some(TmplkitError::MissingVariables { variables, .. }) => (
            Some(format!(
                "Add the missing key(s) to the value mapping, or rerun with --on-missing warn|skip ({} missing)",
                variables.len()
            )),
            None,
        ),
        Some(TmplkitError::RenderFailed { source, .. }) => (
            Some("Check the template for unclosed {{ }} delimiters or invalid expressions".to_string()),
            Some(source.format_with_context()),
        ),
        _ => (None, None),
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(suggestion) = suggestion {
        ctx = ctx.with_suggestion(suggestion);
    }
    if let Some(details) = details {
        ctx = ctx.with_details(details);
    }
    ctx
}
