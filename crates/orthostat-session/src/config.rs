use serde::{Deserialize, Serialize};

use orthostat_core::models::stats::POTS_DELTA_THRESHOLD;

use crate::error::SessionError;

/// Timing and gating rules of the lean-test protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Length of the supine and standing phases.
    pub phase_duration_secs: u32,

    /// Standing-phase sampling interval; a reminder fires on each boundary.
    pub measurement_interval_secs: u32,

    /// Per-second countdown warnings before each sampling boundary.
    pub countdown_secs: u32,

    /// Elapsed standing time after which the test may be completed early.
    pub early_completion_secs: u32,
    pub early_completion_min_measurements: usize,
    pub full_completion_min_measurements: usize,

    /// Supine time below which advancing to standing is flagged as early.
    pub early_advance_warning_secs: u32,
    pub recommended_supine_secs: u32,

    /// Enter the standing phase on its own once supine rest has elapsed.
    pub auto_advance_to_standing: bool,

    pub positive_delta_bpm: u32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            phase_duration_secs: 600,
            measurement_interval_secs: 30,
            countdown_secs: 5,
            early_completion_secs: 300,
            early_completion_min_measurements: 5,
            full_completion_min_measurements: 10,
            early_advance_warning_secs: 180,
            recommended_supine_secs: 300,
            auto_advance_to_standing: false,
            positive_delta_bpm: POTS_DELTA_THRESHOLD,
        }
    }
}

impl ProtocolConfig {
    pub fn validate(&self) -> Result<(), SessionError> {
        let fail = |msg: &str| Err(SessionError::Config(msg.to_string()));

        if self.phase_duration_secs == 0 {
            return fail("phase duration must be positive");
        }
        if self.measurement_interval_secs == 0 {
            return fail("measurement interval must be positive");
        }
        if self.countdown_secs >= self.measurement_interval_secs {
            return fail("countdown must be shorter than the measurement interval");
        }
        if self.early_completion_secs > self.phase_duration_secs {
            return fail("early completion cannot come after the full phase duration");
        }
        if self.early_completion_min_measurements > self.full_completion_min_measurements {
            return fail("early completion cannot need more measurements than full completion");
        }
        if self.positive_delta_bpm == 0 {
            return fail("positive ΔHR threshold must be positive");
        }
        Ok(())
    }
}
