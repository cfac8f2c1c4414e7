use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// ΔHR at or above this many bpm meets the POTS criterion.
pub const POTS_DELTA_THRESHOLD: u32 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TestStats {
    pub lowest: u32,
    pub highest: u32,
    pub delta: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum Interpretation {
    Positive,
    Negative,
}

impl Interpretation {
    pub fn from_delta(delta: u32, threshold: u32) -> Self {
        if delta >= threshold {
            Self::Positive
        } else {
            Self::Negative
        }
    }

    pub fn is_positive(self) -> bool {
        self == Self::Positive
    }

    /// One-line clinical reading, e.g. for the report and text summary.
    pub fn describe(self, threshold: u32) -> String {
        match self {
            Self::Positive => format!("POSITIVE for POTS criteria (ΔHR ≥{threshold} bpm)"),
            Self::Negative => format!("NEGATIVE for POTS criteria (ΔHR <{threshold} bpm)"),
        }
    }
}

impl fmt::Display for Interpretation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => f.write_str("POSITIVE"),
            Self::Negative => f.write_str("NEGATIVE"),
        }
    }
}
