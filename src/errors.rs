// Validation errors

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error code carried by every validation failure.
pub const VALIDATION_FAILED_CODE: u16 = 603;

/// Configuration errors: the engine was misused, no data was judged.
///
/// These never carry the 603 code and abort a run in both modes.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A rule name did not resolve to a registered check.
    #[error("unknown rule: '{name}'")]
    UnknownRule { name: String },

    /// A `regex` rule was given a pattern that does not compile.
    #[error("invalid pattern '{pattern}' for field '{field}'")]
    Pattern {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A parallel per-field task panicked.
    #[error("validation task for field '{field}' failed: {reason}")]
    Task { field: String, reason: String },
}

/// Error returned by a validation run.
#[derive(Debug, Error)]
pub enum ValidateError {
    /// A check failed while the session was in fail-fast mode.
    #[error("{message}")]
    Failed { message: String, code: u16 },

    /// The session was misconfigured.
    #[error(transparent)]
    Config(#[from] RuleError),
}

impl ValidateError {
    /// Build the fail-fast failure for a resolved message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed {
            message: message.into(),
            code: VALIDATION_FAILED_CODE,
        }
    }

    /// The numeric failure code: `Some(603)` for a validation failure,
    /// `None` for configuration errors.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Failed { code, .. } => Some(*code),
            Self::Config(_) => None,
        }
    }
}

/// Ordered collection of failure messages.
///
/// Append-only during a run; insertion order is the only order. No
/// deduplication and no per-field grouping. Serializes as a plain
/// JSON array of strings.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ErrorBag {
    items: Vec<String>,
}

impl ErrorBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(&mut self, message: impl Into<String>) {
        self.items.push(message.into());
    }

    /// The earliest recorded message, if any.
    pub fn first(&self) -> Option<&str> {
        self.items.first().map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// All messages in insertion order.
    pub fn all(&self) -> &[String] {
        &self.items
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.items.iter()
    }
}

impl fmt::Display for ErrorBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for message in &self.items {
            writeln!(f, "{}", message)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a ErrorBag {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
