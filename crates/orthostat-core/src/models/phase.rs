use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TestPhase {
    #[default]
    Setup,
    Supine,
    Standing,
    Complete,
}

impl TestPhase {
    /// Phases during which the timer may run.
    pub fn is_timed(self) -> bool {
        matches!(self, Self::Supine | Self::Standing)
    }
}

impl fmt::Display for TestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Setup => "setup",
            Self::Supine => "supine",
            Self::Standing => "standing",
            Self::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// Why a run reached [`TestPhase::Complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum CompletionReason {
    /// Full protocol: phase duration reached with the full measurement count.
    Completed,
    /// Operator finished after the early-completion gate.
    EarlyCompleted,
    /// Operator aborted the test.
    EmergencyStop,
}
