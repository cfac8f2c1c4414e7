use thiserror::Error;

use orthostat_core::error::{CoreError, ErrorCategory};
use orthostat_core::models::phase::TestPhase;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("cannot {action} during the {phase} phase")]
    InvalidTransition {
        phase: TestPhase,
        action: &'static str,
    },

    #[error("{0}")]
    NotReady(String),

    #[error("invalid protocol configuration: {0}")]
    Config(String),
}

impl SessionError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Core(inner) => inner.category(),
            _ => ErrorCategory::Validation,
        }
    }
}
