//! Typed errors for the extraction pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Every error maps to a
//! stable [`ErrorKind`] so callers can branch without matching on
//! message strings.

use std::fmt;

use thiserror::Error;

/// Errors in caller-supplied input. Fixable by the user.
#[derive(Debug, Error)]
pub enum InputError {
    /// Document contains no extractable text after normalization
    #[error("document contains no extractable text")]
    EmptyDocument,

    /// File format not handled by the text-extraction collaborator
    #[error("unsupported document format: {format}")]
    UnsupportedFormat { format: String },

    /// File could not be read by the text-extraction collaborator
    #[error("corrupt document: {reason}")]
    CorruptFile { reason: String },
}

/// Errors from the external LLM service.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Network-level failure reaching the service
    #[error("LLM service unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request exceeded its time budget
    #[error("LLM request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Non-2xx response from the service
    #[error("LLM API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Service answered with no usable text
    #[error("LLM returned an empty response")]
    EmptyResponse,

    /// Client misconfiguration (missing API key, bad URL)
    #[error("LLM client configuration error: {0}")]
    Config(String),
}

impl LlmError {
    /// Whether retrying the same request may succeed.
    ///
    /// Only transient classes are retried by the orchestrator; a
    /// malformed model response goes through the repair path instead.
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Unavailable(_) | LlmError::Timeout { .. } | LlmError::EmptyResponse => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Config(_) => false,
        }
    }
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Path into the candidate structure, e.g. `sectors[2].sub_categories[0].action_points[1].achievement_percentage`
    pub path: String,

    /// What went wrong
    pub kind: FieldErrorKind,

    /// Human-readable detail
    pub message: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Classification of a field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldErrorKind {
    /// Required field absent or empty
    MissingField,

    /// Value has the wrong JSON type
    TypeMismatch,

    /// achievement_percentage outside [0, 100]
    OutOfRange,

    /// Sector name not in the controlled vocabulary
    UnknownSector,

    /// Sub-category name not in the controlled vocabulary
    UnknownSubCategory,

    /// Scope has neither action points nor additional details
    EmptyScope,
}

/// LLM output did not conform to the schema, even after the repair attempt.
///
/// Carries the field errors from the last validation pass. The source
/// document is retained for audit; nothing is committed.
#[derive(Debug, Error)]
#[error("extraction failed schema validation ({} errors)", .errors.len())]
pub struct SchemaViolation {
    pub errors: Vec<FieldError>,
}

impl SchemaViolation {
    pub fn new(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }

    /// Single-error convenience, used when JSON parsing itself fails.
    pub fn parse_failure(message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError::new(
                "$",
                FieldErrorKind::TypeMismatch,
                message.into(),
            )],
        }
    }
}

/// Errors that can occur during pipeline operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// User-fixable input problem
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// External LLM failure, surfaced after the retry budget
    #[error("LLM service error: {0}")]
    Llm(#[from] LlmError),

    /// LLM output failed validation after the repair attempt
    #[error(transparent)]
    Schema(#[from] SchemaViolation),

    /// Version-manager invariant violation. Must never occur in
    /// correct operation; logged for investigation.
    #[error("version invariant violated: {0}")]
    Consistency(String),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,
}

/// Stable classification for callers that branch on failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User-fixable input problem
    Input,

    /// Retryable service failure
    Transient,

    /// LLM output did not conform to the schema
    SchemaViolation,

    /// Version invariant violation (internal, fatal)
    Consistency,

    /// Everything else (storage, cancellation, configuration)
    Internal,
}

impl PipelineError {
    /// Stable error kind for this failure.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Input(_) => ErrorKind::Input,
            PipelineError::Llm(e) if e.is_transient() => ErrorKind::Transient,
            PipelineError::Llm(_) => ErrorKind::Internal,
            PipelineError::Schema(_) => ErrorKind::SchemaViolation,
            PipelineError::Consistency(_) => ErrorKind::Consistency,
            PipelineError::Storage(_) | PipelineError::Cancelled => ErrorKind::Internal,
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
