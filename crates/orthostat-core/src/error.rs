use thiserror::Error;

/// How a failure should be presented to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Input outside its domain or a required field missing.
    Validation,
    /// Malformed `M:SS` time string.
    Format,
    /// A measurement already occupies the requested time.
    Conflict,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("heart rate must be between {min}-{max} bpm (got {value})")]
    InvalidPulseRate { value: u32, min: u32, max: u32 },

    #[error("{field} must be a whole number (got '{input}')")]
    InvalidNumber { field: String, input: String },

    #[error("invalid time '{input}': {reason}")]
    InvalidTime { input: String, reason: String },

    #[error("a measurement already exists at {label}")]
    DuplicateTime { label: String },

    #[error("no measurement recorded at {label}")]
    MeasurementNotFound { label: String },

    #[error("missing required field: {0}")]
    MissingField(String),
}

impl CoreError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTime { .. } => ErrorCategory::Format,
            Self::DuplicateTime { .. } => ErrorCategory::Conflict,
            Self::InvalidPulseRate { .. }
            | Self::InvalidNumber { .. }
            | Self::MeasurementNotFound { .. }
            | Self::MissingField(_) => ErrorCategory::Validation,
        }
    }
}
