use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;
use crate::ledger::Ledger;
use crate::models::blood_pressure::BloodPressure;
use crate::models::chart::ChartPoint;
use crate::models::measurement::Measurement;
use crate::models::stats::TestStats;
use crate::series;
use crate::stats;

/// Everything recorded for one patient's lean test.
///
/// Created empty at start, filled in through setup and the supine phase;
/// the ledger only receives entries from the standing phase onward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TestRun {
    pub patient_name: String,
    pub test_date: jiff::civil::Date,
    pub initial_bp: BloodPressure,
    /// Pulse rate taken with the baseline blood pressure.
    pub initial_pr: Option<u32>,
    /// Operator-observed minimum during supine rest.
    pub lowest_supine_pr: Option<u32>,
    #[ts(as = "Vec<Measurement>")]
    pub ledger: Ledger,
}

impl TestRun {
    pub fn new(test_date: jiff::civil::Date) -> Self {
        Self {
            patient_name: String::new(),
            test_date,
            initial_bp: BloodPressure::default(),
            initial_pr: None,
            lowest_supine_pr: None,
            ledger: Ledger::new(),
        }
    }

    /// Supine baseline used for ΔHR: the lowest supine reading, falling
    /// back to the initial pulse rate.
    pub fn baseline_pr(&self) -> Option<u32> {
        self.lowest_supine_pr.or(self.initial_pr)
    }

    /// Check the fields required before the supine phase may begin.
    pub fn check_setup(&self) -> Result<(), CoreError> {
        if self.patient_name.trim().is_empty() {
            return Err(CoreError::MissingField("patient name".to_string()));
        }
        if !self.initial_bp.is_complete() {
            return Err(CoreError::MissingField("blood pressure".to_string()));
        }
        if self.initial_pr.is_none() {
            return Err(CoreError::MissingField("initial pulse rate".to_string()));
        }
        Ok(())
    }

    pub fn stats(&self) -> TestStats {
        stats::compute_stats(self.baseline_pr(), &self.ledger)
    }

    pub fn chart_series(&self, with_trend: bool) -> Vec<ChartPoint> {
        let points = series::build_series(self.initial_pr, self.lowest_supine_pr, &self.ledger);
        if with_trend {
            series::attach_trend(points)
        } else {
            points
        }
    }
}
