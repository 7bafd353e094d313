use crate::ast::Span;
use crate::numeric::NumericError;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Detailed error information with source location
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub message: String,
    pub span: Span,
    pub source_id: String,
    pub source_text: Arc<str>,
    pub suggestion: Option<String>,
}

/// Errors raised while turning user text into calculator inputs
#[derive(Debug, Clone)]
pub enum CalcError {
    /// Parse error with source location
    Parse(Box<ErrorDetails>),

    /// Input rejected before it reaches the engine
    Engine(String),

    /// Resource limit exceeded
    ResourceLimitExceeded {
        limit_name: String,
        limit_value: String,
        actual_value: String,
        suggestion: String,
    },
}

impl CalcError {
    /// Create a parse error with source information
    pub fn parse(
        message: impl Into<String>,
        span: Span,
        source_id: impl Into<String>,
        source_text: Arc<str>,
    ) -> Self {
        Self::Parse(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_id: source_id.into(),
            source_text,
            suggestion: None,
        }))
    }

    /// Create a parse error with suggestion
    pub fn parse_with_suggestion(
        message: impl Into<String>,
        span: Span,
        source_id: impl Into<String>,
        source_text: Arc<str>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Parse(Box::new(ErrorDetails {
            message: message.into(),
            span,
            source_id: source_id.into(),
            source_text,
            suggestion: Some(suggestion.into()),
        }))
    }
}

impl fmt::Display for CalcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalcError::Parse(details) => {
                write!(f, "Parse error: {}", details.message)?;
                if let Some(suggestion) = &details.suggestion {
                    write!(f, " (suggestion: {})", suggestion)?;
                }
                write!(
                    f,
                    " at {}:{}:{}",
                    details.source_id, details.span.line, details.span.col
                )
            }
            CalcError::Engine(msg) => write!(f, "Engine error: {}", msg),
            CalcError::ResourceLimitExceeded {
                limit_name,
                limit_value,
                actual_value,
                suggestion,
            } => write!(
                f,
                "Resource limit exceeded: {} (limit: {}, actual: {}). {}",
                limit_name, limit_value, actual_value, suggestion
            ),
        }
    }
}

impl std::error::Error for CalcError {}

/// Faults reported by the symbolic engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The expression has no value at the requested point
    #[error("undefined: {0}")]
    Undefined(String),

    #[error("unsupported expression: {0}")]
    Unsupported(String),

    #[error("limit does not exist: {0}")]
    LimitDoesNotExist(String),

    /// The result depends on information the engine does not have
    #[error("cannot be determined: {0}")]
    Indeterminate(String),

    #[error("no closed form: {0}")]
    NoClosedForm(String),

    #[error("resource limit exceeded: {0}")]
    ResourceLimit(String),

    #[error(transparent)]
    Numeric(#[from] NumericError),
}

/// Category of a failed analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// The relation token is not one of `<`, `>`, `<=`, `>=`
    InvalidRelation,
    SolveFailure,
    LimitFailure,
    DerivativeFailure,
    AnalysisFailure,
    /// The engine crashed instead of reporting an error
    EngineFault,
}

impl ErrorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::InvalidRelation => "invalid relation",
            ErrorKind::SolveFailure => "solve failure",
            ErrorKind::LimitFailure => "limit failure",
            ErrorKind::DerivativeFailure => "derivative failure",
            ErrorKind::AnalysisFailure => "analysis failure",
            ErrorKind::EngineFault => "engine fault",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A structured failure of one analysis operation
///
/// The message carries the engine diagnostic verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Failure {}
