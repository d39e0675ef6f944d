use thiserror::Error;

/// Errors raised by the amortization engine, the schedule projector and the
/// amount formatter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoanError {
    /// A loan parameter or a piece of user text failed validation.
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// An amount grew past what a whole-unit `u64` (or the decimal backing it) can hold.
    #[error("Arithmetic overflow while computing {context}")]
    Overflow { context: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl LoanError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        LoanError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        LoanError::Overflow {
            context: context.into(),
        }
    }

    /// True for errors caused by bad input rather than by arithmetic limits.
    pub fn is_validation(&self) -> bool {
        matches!(self, LoanError::InvalidInput { .. })
    }

    /// The offending field, when the error names one.
    pub fn field(&self) -> Option<&str> {
        match self {
            LoanError::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LoanError {
    fn from(e: serde_json::Error) -> Self {
        LoanError::Config(e.to_string())
    }
}
