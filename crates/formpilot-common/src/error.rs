use crate::protocol::ElementId;
use thiserror::Error;

/// Failures raised by a document implementation.
#[derive(Debug, Error)]
pub enum DomError {
    #[error("Document not ready")]
    NotReady,

    #[error("Element {id} is stale (removed from the document)")]
    StaleElement { id: ElementId },

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    #[error("Page script error: {0}")]
    Script(String),

    #[error("Page evaluation timed out")]
    Timeout,

    #[error("Page context lost: {0}")]
    ContextLost(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Other: {0}")]
    Other(String),
}

impl DomError {
    /// Stable code for the error, shared with the page runtime's error codes.
    pub fn code(&self) -> &'static str {
        match self {
            DomError::NotReady => "NOT_READY",
            DomError::StaleElement { .. } => "STALE_ELEMENT",
            DomError::InvalidSelector { .. } => "INVALID_SELECTOR",
            DomError::NotSupported(_) => "NOT_SUPPORTED",
            DomError::Script(_) => "SCRIPT_ERROR",
            DomError::Timeout => "TIMEOUT",
            DomError::ContextLost(_) => "CONTEXT_LOST",
            DomError::Serialization(_) => "SERIALIZATION_ERROR",
            DomError::Other(_) => "INTERNAL_ERROR",
        }
    }
}

/// Failures that end an automation run.
#[derive(Debug, Error)]
pub enum AutomationError {
    /// A required element never appeared within its timeout.
    #[error("Element not found: {locator}")]
    NotFound { locator: String },

    /// The combo box never rendered an option containing the typed text.
    #[error("{label} option not found in dropdown: {text}")]
    OptionNotFound { label: String, text: String },

    #[error(transparent)]
    Dom(#[from] DomError),
}

impl AutomationError {
    pub fn not_found(locator: impl Into<String>) -> Self {
        AutomationError::NotFound {
            locator: locator.into(),
        }
    }
}
