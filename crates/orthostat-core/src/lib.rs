//! orthostat-core
//!
//! Pure domain types for the NASA 10-Minute Lean Test: the measurement
//! ledger, `M:SS` clock handling, summary statistics and the chart series.
//! No I/O and no async: this is the shared vocabulary of the workspace.

pub mod clock;
pub mod error;
pub mod ledger;
pub mod models;
pub mod series;
pub mod stats;
