use crate::ledger::Ledger;
use crate::models::stats::{Interpretation, TestStats};

/// Summary statistics for a run.
///
/// `lowest` is the supine baseline and `highest` the standing peak, so
/// `delta` is the baseline-to-peak orthostatic rise. Without a baseline the
/// ledger minimum stands in; without measurements the baseline is both ends.
/// A standing peak below the baseline yields a delta of zero.
pub fn compute_stats(baseline: Option<u32>, ledger: &Ledger) -> TestStats {
    let peak = ledger.pulse_rates().max();
    let trough = ledger.pulse_rates().min();

    let Some(lowest) = baseline.or(trough) else {
        return TestStats::default();
    };
    let highest = peak.unwrap_or(lowest);

    TestStats {
        lowest,
        highest,
        delta: highest.saturating_sub(lowest),
    }
}

pub fn interpret(stats: &TestStats, threshold: u32) -> Interpretation {
    Interpretation::from_delta(stats.delta, threshold)
}
