use serde::Serialize;

use orthostat_core::models::chart::ChartPoint;
use orthostat_core::models::measurement::Measurement;
use orthostat_core::models::stats::{Interpretation, TestStats};
use orthostat_core::models::test_run::TestRun;
use orthostat_core::stats::interpret;

use crate::error::ExportError;
use crate::styles::{ClinicInfo, ReportOptions, TRUNCATED_MEASUREMENT_ROWS};

/// One standing reading as it appears in exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeasurementRow {
    pub time: String,
    pub total_seconds: u32,
    pub pulse_rate: u32,
    pub symptoms: String,
}

impl From<&Measurement> for MeasurementRow {
    fn from(m: &Measurement) -> Self {
        Self {
            time: m.label(),
            total_seconds: m.total_seconds,
            pulse_rate: m.pulse_rate,
            symptoms: m.symptoms.clone(),
        }
    }
}

/// Read-only snapshot of a run, shaped for templates and documents.
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    pub patient_name: String,
    pub test_date: jiff::civil::Date,
    /// `systolic/diastolic`, absent unless both were captured.
    pub initial_bp: Option<String>,
    pub initial_pr: Option<u32>,
    pub lowest_supine_pr: Option<u32>,
    /// Ascending by time.
    pub measurements: Vec<MeasurementRow>,
    pub stats: TestStats,
    pub interpretation: Interpretation,
    pub interpretation_text: String,
    pub threshold: u32,
    pub generated_at: String,
    pub clinic: ClinicInfo,
    #[serde(skip)]
    pub series: Vec<ChartPoint>,
}

impl ReportData {
    pub fn from_run(
        run: &TestRun,
        threshold: u32,
        clinic: ClinicInfo,
        generated_at: &jiff::Zoned,
    ) -> Self {
        let stats = run.stats();
        let interpretation = interpret(&stats, threshold);
        Self {
            patient_name: run.patient_name.trim().to_string(),
            test_date: run.test_date,
            initial_bp: run
                .initial_bp
                .is_complete()
                .then(|| run.initial_bp.to_string()),
            initial_pr: run.initial_pr,
            lowest_supine_pr: run.lowest_supine_pr,
            measurements: run.ledger.iter().map(MeasurementRow::from).collect(),
            stats,
            interpretation,
            interpretation_text: interpretation.describe(threshold),
            threshold,
            generated_at: generated_at.strftime("%Y-%m-%d %H:%M").to_string(),
            clinic,
            series: run.chart_series(true),
        }
    }

    /// Documents are filed under the patient's name, so it must be present.
    pub fn require_patient_name(&self) -> Result<(), ExportError> {
        if self.patient_name.is_empty() {
            return Err(ExportError::MissingField("patient name"));
        }
        Ok(())
    }

    /// Rows for the report table and how many were left out.
    pub fn table_rows(&self, options: &ReportOptions) -> (&[MeasurementRow], usize) {
        if options.include_all_measurements || self.measurements.len() <= TRUNCATED_MEASUREMENT_ROWS {
            (&self.measurements, 0)
        } else {
            (
                &self.measurements[..TRUNCATED_MEASUREMENT_ROWS],
                self.measurements.len() - TRUNCATED_MEASUREMENT_ROWS,
            )
        }
    }

    /// The narrative paragraph of the report.
    pub fn interpretation_paragraph(&self) -> String {
        if self.interpretation.is_positive() {
            format!(
                "The heart rate increase of {} bpm meets the criteria for POTS (>={} bpm increase). This suggests possible orthostatic intolerance.",
                self.stats.delta, self.threshold
            )
        } else {
            format!(
                "The heart rate increase of {} bpm does not meet the criteria for POTS (<{} bpm increase). This is within normal limits.",
                self.stats.delta, self.threshold
            )
        }
    }
}

pub const CLINICAL_DISCLAIMER: &str = "Note: This test result should be interpreted by a qualified healthcare provider in conjunction with clinical symptoms and other diagnostic findings.";
