mod support;

use orthostat_core::models::test_run::TestRun;
use orthostat_export::render::render_summary;

use support::{report_data, sample_run};

#[test]
fn summary_lists_each_measurement_once_in_time_order() {
    let text = render_summary(&report_data(&sample_run())).unwrap();

    assert!(text.starts_with("NASA 10-Minute Lean Test Results\n"));
    assert!(text.contains("Patient: Jane Doe\n"));
    assert!(text.contains("Test Date: 2025-03-14\n"));
    assert!(text.contains("- Blood Pressure: 118/76 mmHg\n"));
    assert!(text.contains("- Lowest Supine Pulse Rate: 65 bpm\n"));

    let block = "Standing Measurements:\n0:00: 78 bpm\n0:30: 95 bpm (Dizziness, Palpitations)\n1:00: 110 bpm\n\nResults:";
    assert!(text.contains(block), "{text}");
    assert_eq!(text.matches(" bpm (").count(), 1);
}

#[test]
fn summary_reports_stats_and_interpretation() {
    let text = render_summary(&report_data(&sample_run())).unwrap();

    assert!(text.contains("- Lowest HR: 65 bpm\n"));
    assert!(text.contains("- Highest HR: 110 bpm\n"));
    assert!(text.contains("- Maximum ΔHR: 45 bpm\n"));
    assert!(text.contains("Interpretation: POSITIVE for POTS criteria (ΔHR ≥30 bpm)\n"));
    assert!(text.ends_with("Generated: 2025-03-14 10:30\n"));
}

#[test]
fn summary_of_empty_run_marks_missing_values() {
    let run = TestRun::new(jiff::civil::date(2025, 3, 14));
    let text = render_summary(&report_data(&run)).unwrap();

    assert!(text.contains("- Blood Pressure: not recorded\n"));
    assert!(text.contains("Standing Measurements:\nnone recorded\n"));
    assert!(text.contains("- Maximum ΔHR: 0 bpm\n"));
    assert!(text.contains("NEGATIVE for POTS criteria"));
}
