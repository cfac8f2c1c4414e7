use orthostat_core::models::blood_pressure::BloodPressure;
use orthostat_core::models::test_run::TestRun;
use orthostat_export::report::ReportData;
use orthostat_export::styles::ClinicInfo;

const NONE: [&str; 0] = [];

pub fn sample_run() -> TestRun {
    let mut run = TestRun::new(jiff::civil::date(2025, 3, 14));
    run.patient_name = "Jane Doe".to_string();
    run.initial_bp = BloodPressure::new(118, 76);
    run.initial_pr = Some(72);
    run.lowest_supine_pr = Some(65);
    // Inserted out of order on purpose.
    run.ledger.add(60, 110, NONE).unwrap();
    run.ledger.add(0, 78, NONE).unwrap();
    run.ledger.add(30, 95, ["Dizziness", "Palpitations"]).unwrap();
    run
}

pub fn generated_at() -> jiff::Zoned {
    "2025-03-14T10:30:00[UTC]".parse().unwrap()
}

pub fn report_data(run: &TestRun) -> ReportData {
    ReportData::from_run(run, 30, ClinicInfo::default(), &generated_at())
}
