use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A single plotted heart-rate point. Pre-test points sit at negative times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ChartPoint {
    /// Minutes since standing; `-2` and `-1` for the supine baselines.
    pub time: f64,
    pub heart_rate: u32,
    pub label: String,
    pub is_pre_test: bool,
    /// Value of the standing-phase trend line at `time`, when requested.
    pub trend_value: Option<f64>,
}

/// Ordinary least-squares fit `heart_rate = slope * time + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn value_at(&self, time: f64) -> f64 {
        self.slope * time + self.intercept
    }
}
