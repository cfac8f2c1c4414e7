pub mod blood_pressure;
pub mod chart;
pub mod measurement;
pub mod phase;
pub mod stats;
pub mod test_run;
