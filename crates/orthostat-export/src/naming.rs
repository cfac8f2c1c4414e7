//! File names for exported artifacts.

/// Collapse each whitespace run in a patient name into one hyphen.
pub fn file_safe_name(patient_name: &str) -> String {
    patient_name.split_whitespace().collect::<Vec<_>>().join("-")
}

/// `<kind>-<patient>-<date>.png`, e.g. `pots-chart-Jane-Doe-2025-03-14.png`.
pub fn chart_file_name(kind: &str, patient_name: &str, test_date: jiff::civil::Date) -> String {
    format!("{kind}-{}-{test_date}.png", file_safe_name(patient_name))
}

pub fn report_file_name(patient_name: &str, test_date: jiff::civil::Date) -> String {
    format!("POTS-Report-{}-{test_date}.docx", file_safe_name(patient_name))
}

pub fn summary_file_name(patient_name: &str, test_date: jiff::civil::Date) -> String {
    format!("POTS-Summary-{}-{test_date}.txt", file_safe_name(patient_name))
}
