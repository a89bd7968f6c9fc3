//! # Export Error Handling
//!
//! Error types for the badge export pipeline. Every failure is scoped to a
//! single export attempt: nothing here is fatal to the interactive session.
//!
//! ## Taxonomy
//!
//! | Kind | Raised by | Retried? |
//! |------|-----------|----------|
//! | `Validation` | caller-side checks before the pipeline runs | never |
//! | `Capture` | surface rasterization, resource wait, compositing | never |
//! | `Encode` | bitmap serialization or artifact validation | once, at reduced quality, on constrained devices only |
//! | `State` | a second export while one is in flight | never |
//! | `Io` | the persisted store and download sinks | never |
//! | `External` | third-party libraries (serde_json) | never |
//!
//! Callers should match on [`ExportError::kind`], not on message text.
//!
//! ## Usage
//!
//! ```rust
//! use badge_export::error::{ErrorKind, ExportError, HasRecoverySuggestion};
//!
//! let error = ExportError::encode("png", "artifact is empty")
//!     .with_operation("encode")
//!     .with_recovery_suggestion("Try a smaller resolution");
//!
//! assert_eq!(error.kind(), ErrorKind::Encode);
//! assert_eq!(error.recovery_suggestion(), Some("Try a smaller resolution"));
//! ```

use std::{error::Error as StdError, fmt, time::SystemTime};

/// Severity levels for errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Warnings that may indicate potential issues
    Warning,
    /// Errors that abort the current export
    Error,
    /// Errors that need the user to change something before retrying
    Critical,
}

/// Metadata about when and where an error occurred
#[derive(Debug, Clone)]
pub struct ErrorContext {
    /// When the error occurred
    pub timestamp: SystemTime,
    /// The pipeline stage being performed when the error occurred
    pub operation: Option<String>,
    /// Additional context about the error
    pub context: Option<String>,
    /// Suggested recovery action, shown to the user
    pub recovery_suggestion: Option<String>,
    /// Error severity level
    pub severity: ErrorSeverity,
    /// Whether a retry at reduced quality is worth attempting
    pub retryable: bool,
    /// Additional metadata as key-value pairs
    pub metadata: std::collections::HashMap<String, String>,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            operation: None,
            context: None,
            recovery_suggestion: None,
            severity: ErrorSeverity::Error,
            retryable: false,
            metadata: std::collections::HashMap::new(),
        }
    }
}

impl ErrorContext {
    /// Create a new error context
    pub fn new() -> Self {
        Self::default()
    }
}

/// Error kind, the stable part of the public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Capture,
    Encode,
    State,
    Io,
    External,
}

/// Base error type for the export pipeline
#[derive(Debug)]
pub enum ExportError {
    /// A required field is missing or out of range; never reaches the pipeline core
    Validation {
        field: String,
        constraint: String,
        value: String,
        context: ErrorContext,
    },
    /// The live surface could not be rasterized
    Capture {
        stage: String,
        reason: String,
        context: ErrorContext,
    },
    /// The bitmap could not be serialized, or the output failed validation
    Encode {
        format: String,
        reason: String,
        context: ErrorContext,
    },
    /// Invalid state for the attempted operation
    State {
        current_state: String,
        attempted_operation: String,
        reason: String,
        context: ErrorContext,
    },
    /// I/O errors
    Io {
        operation: String,
        path: Option<String>,
        source: std::io::Error,
        context: ErrorContext,
    },
    /// External library errors
    External {
        library: String,
        source: Box<dyn StdError + Send + Sync>,
        context: ErrorContext,
    },
}

impl ExportError {
    /// Create a validation error
    pub fn validation(
        field: impl Into<String>,
        constraint: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::Validation {
            field: field.into(),
            constraint: constraint.into(),
            value: value.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a capture error
    pub fn capture(stage: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Capture {
            stage: stage.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an encode error
    pub fn encode(format: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Encode {
            format: format.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a state error
    pub fn state(
        current_state: impl Into<String>,
        attempted_operation: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::State {
            current_state: current_state.into(),
            attempted_operation: attempted_operation.into(),
            reason: reason.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: None,
            source,
            context: ErrorContext::new(),
        }
    }

    /// Create an external library error
    pub fn external(
        library: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            library: library.into(),
            source: Box::new(source),
            context: ErrorContext::new(),
        }
    }

    /// Attach the path an I/O error happened on
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        if let Self::Io { path: p, .. } = &mut self {
            *p = Some(path.into());
        }
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context_mut().context = Some(context.into());
        self
    }

    /// Add operation context
    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.context_mut().operation = Some(operation.into());
        self
    }

    /// Add recovery suggestion
    pub fn with_recovery_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context_mut().recovery_suggestion = Some(suggestion.into());
        self
    }

    /// Set severity
    pub fn with_severity(mut self, severity: ErrorSeverity) -> Self {
        self.context_mut().severity = severity;
        self
    }

    /// Mark as retryable
    pub fn retryable(mut self) -> Self {
        self.context_mut().retryable = true;
        self
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context_mut().metadata.insert(key.into(), value.into());
        self
    }

    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            Self::Validation { context, .. } => context,
            Self::Capture { context, .. } => context,
            Self::Encode { context, .. } => context,
            Self::State { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::External { context, .. } => context,
        }
    }

    fn context_mut(&mut self) -> &mut ErrorContext {
        match self {
            Self::Validation { context, .. } => context,
            Self::Capture { context, .. } => context,
            Self::Encode { context, .. } => context,
            Self::State { context, .. } => context,
            Self::Io { context, .. } => context,
            Self::External { context, .. } => context,
        }
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Capture { .. } => ErrorKind::Capture,
            Self::Encode { .. } => ErrorKind::Encode,
            Self::State { .. } => ErrorKind::State,
            Self::Io { .. } => ErrorKind::Io,
            Self::External { .. } => ErrorKind::External,
        }
    }

    /// Get the error category as a string, used as a log field
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Capture { .. } => "capture",
            Self::Encode { .. } => "encode",
            Self::State { .. } => "state",
            Self::Io { .. } => "io",
            Self::External { .. } => "external",
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::Validation {
                field,
                constraint,
                value,
                ..
            } => {
                write!(
                    f,
                    "Validation failed for '{}': {} (value: {:?})",
                    field, constraint, value
                )
            }
            ExportError::Capture { stage, reason, .. } => {
                write!(f, "Capture failed during {}: {}", stage, reason)
            }
            ExportError::Encode { format, reason, .. } => {
                write!(f, "Encoding {} failed: {}", format, reason)
            }
            ExportError::State {
                current_state,
                attempted_operation,
                reason,
                ..
            } => {
                write!(
                    f,
                    "Cannot {} while {}: {}",
                    attempted_operation, current_state, reason
                )
            }
            ExportError::Io {
                operation,
                path,
                source,
                ..
            } => {
                if let Some(path) = path {
                    write!(f, "I/O error during {} on '{}': {}", operation, path, source)
                } else {
                    write!(f, "I/O error during {}: {}", operation, source)
                }
            }
            ExportError::External {
                library, source, ..
            } => {
                write!(f, "External library error in {}: {}", library, source)
            }
        }
    }
}

impl StdError for ExportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::External { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias using our custom error type
pub type ExportResult<T> = Result<T, ExportError>;

/// Trait for errors that can be retried
pub trait Retryable {
    /// Check if this error can be retried
    fn is_retryable(&self) -> bool;
}

impl Retryable for ExportError {
    fn is_retryable(&self) -> bool {
        // Only encoder failures have a degraded retry path.
        self.context().retryable && matches!(self, Self::Encode { .. })
    }
}

/// Trait for errors with severity levels
pub trait HasSeverity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

impl HasSeverity for ExportError {
    fn severity(&self) -> ErrorSeverity {
        self.context().severity
    }
}

/// Trait for errors that provide recovery suggestions
pub trait HasRecoverySuggestion {
    /// Get recovery suggestion for this error
    fn recovery_suggestion(&self) -> Option<&str>;
}

impl HasRecoverySuggestion for ExportError {
    fn recovery_suggestion(&self) -> Option<&str> {
        self.context().recovery_suggestion.as_deref()
    }
}

/// Error classification utilities
pub mod classify {
    use super::*;

    /// Errors the user fixes in the form, shown inline rather than as a toast
    pub fn is_field_error(error: &ExportError) -> bool {
        matches!(error, ExportError::Validation { .. })
    }

    /// Errors from the export core itself (capture or encode)
    pub fn is_export_failure(error: &ExportError) -> bool {
        matches!(error, ExportError::Capture { .. } | ExportError::Encode { .. })
    }

    /// Check if an error requires user intervention
    pub fn requires_user_intervention(error: &ExportError) -> bool {
        error.severity() >= ErrorSeverity::Critical
    }
}

impl From<std::io::Error> for ExportError {
    fn from(error: std::io::Error) -> Self {
        Self::io("unknown", error)
    }
}

impl From<serde_json::Error> for ExportError {
    fn from(error: serde_json::Error) -> Self {
        Self::external("serde_json", error)
    }
}
