//! User-visible diagnostics.
//!
//! Every user action reports its outcome as a list of notices. None of them
//! are fatal; the UI renders them and the session carries on.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Success => "ok",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A single advisory message produced by a session action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Build a notice and mirror it into the log at the matching level.
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        let message = message.into();
        match severity {
            Severity::Success => tracing::info!(notice = %message, "Action succeeded"),
            Severity::Warning => tracing::warn!(notice = %message, "Action warning"),
            Severity::Error => tracing::error!(notice = %message, "Action failed"),
        }
        Self { severity, message }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity.label(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes_label() {
        assert_eq!(
            Notice::warning("Sheet EMPTY is empty and has been skipped.").to_string(),
            "[warning] Sheet EMPTY is empty and has been skipped."
        );
        assert_eq!(Notice::success("Saved").to_string(), "[ok] Saved");
    }

    #[test]
    fn test_only_errors_are_errors() {
        assert!(Notice::error("x").is_error());
        assert!(!Notice::warning("x").is_error());
        assert!(!Notice::success("x").is_error());
    }
}
