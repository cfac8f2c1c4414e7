mod support;

use orthostat_export::chart::render_png;
use orthostat_export::docx::{generate_report, table_cells, CHART_MARKER};
use orthostat_export::error::ExportError;
use orthostat_export::render::render_report;
use orthostat_export::styles::{
    DocumentStyles, Orientation, PaperSize, ReportOptions, TRUNCATED_MEASUREMENT_ROWS,
};

use support::{report_data, sample_run};

const NONE: [&str; 0] = [];

fn long_run() -> orthostat_core::models::test_run::TestRun {
    let mut run = sample_run();
    for i in 3..20 {
        run.ledger.add(i * 30, 90 + i, NONE).unwrap();
    }
    run
}

#[test]
fn report_text_has_every_section() {
    let data = report_data(&sample_run());
    let text = render_report(&data, &ReportOptions::default(), true).unwrap();

    assert!(text.starts_with("# Medical Clinic\n"));
    assert!(text.contains("**Patient:** Jane Doe"));
    assert!(text.contains("**Result:** POSITIVE"));
    assert!(text.contains("| Blood Pressure | 118/76 mmHg |"));
    assert!(text.contains("| Measurements Recorded | 3 |"));
    assert!(text.lines().any(|l| l.trim() == CHART_MARKER));
    assert!(text.contains("| 0:30 | 95 bpm | Dizziness, Palpitations |"));
    assert!(text.contains("meets the criteria for POTS (>=30 bpm increase)"));
    assert!(text.contains("qualified healthcare provider"));
}

#[test]
fn truncated_table_notes_the_remainder() {
    let data = report_data(&long_run());
    let options = ReportOptions {
        include_all_measurements: false,
        ..ReportOptions::default()
    };
    let text = render_report(&data, &options, false).unwrap();

    let rows: Vec<Vec<String>> = text
        .lines()
        .skip_while(|l| !l.starts_with("| Time |"))
        .map_while(table_cells)
        .collect();
    assert_eq!(rows.len(), 1 + TRUNCATED_MEASUREMENT_ROWS + 1);
    assert_eq!(rows.last().unwrap()[0], "... and 5 more measurements");

    let all = render_report(&data, &ReportOptions::default(), false).unwrap();
    assert!(!all.contains("more measurements"));
    assert!(all.contains("| 9:30 | 109 bpm |"));
}

#[test]
fn optional_sections_can_be_left_out() {
    let data = report_data(&sample_run());
    let options = ReportOptions {
        include_symptoms: false,
        include_interpretation: false,
        ..ReportOptions::default()
    };
    let text = render_report(&data, &options, false).unwrap();

    assert!(text.contains("| Time | Heart Rate |\n"));
    assert!(!text.contains("Dizziness"));
    assert!(!text.contains("Clinical Interpretation"));
    assert!(!text.lines().any(|l| l.trim() == CHART_MARKER));
}

#[test]
fn report_requires_patient_name() {
    let mut run = sample_run();
    run.patient_name = "  ".to_string();
    let data = report_data(&run);

    let err = generate_report(&data, &ReportOptions::default(), &DocumentStyles::default(), None)
        .unwrap_err();
    assert!(matches!(err, ExportError::MissingField("patient name")));
}

#[test]
fn report_is_a_docx_package() {
    let data = report_data(&long_run());
    let chart = render_png(&data.series, 400, 200, [255, 255, 255]).unwrap();
    let options = ReportOptions {
        paper: PaperSize::Letter,
        orientation: Orientation::Landscape,
        ..ReportOptions::default()
    };

    let bytes =
        generate_report(&data, &options, &DocumentStyles::default(), Some(&chart)).unwrap();
    assert_eq!(&bytes[..2], b"PK");

    let without_chart =
        generate_report(&data, &options, &DocumentStyles::default(), None).unwrap();
    assert_eq!(&without_chart[..2], b"PK");
}

#[test]
fn options_parse_and_reject_unknown_keys() {
    let options = ReportOptions::from_json(r#"{"paper":"Letter","orientation":"landscape"}"#).unwrap();
    assert_eq!(options.paper, PaperSize::Letter);
    assert_eq!(options.orientation, Orientation::Landscape);
    assert!(options.include_chart);
    assert_eq!(options.page_twips(), (15840, 12240));

    assert!(matches!(
        ReportOptions::from_json(r#"{"format":"A3"}"#),
        Err(ExportError::InvalidOptions(_))
    ));
}

#[test]
fn styles_reject_bad_margins() {
    let styles = DocumentStyles {
        margin_inches: 3.0,
        ..DocumentStyles::default()
    };
    assert!(styles.validate().is_err());
    assert!(DocumentStyles::default().validate().is_ok());
}
