use std::sync::Arc;

use orthostat_core::error::ErrorCategory;
use orthostat_core::models::blood_pressure::BloodPressure;
use orthostat_core::models::phase::{CompletionReason, TestPhase};
use orthostat_core::models::stats::Interpretation;
use orthostat_session::config::ProtocolConfig;
use orthostat_session::error::SessionError;
use orthostat_session::events::{SessionEvent, TimerEvent};
use orthostat_session::notifier::{BufferedNotifier, NoticeLevel};
use orthostat_session::session::{CompletionOption, Session};

const NONE: [&str; 0] = [];

fn session_with(config: ProtocolConfig) -> (Session, Arc<BufferedNotifier>) {
    let notifier = Arc::new(BufferedNotifier::new());
    let session = Session::new(config, notifier.clone(), jiff::civil::date(2025, 3, 14)).unwrap();
    (session, notifier)
}

fn new_session() -> (Session, Arc<BufferedNotifier>) {
    session_with(ProtocolConfig::default())
}

fn fill_setup(session: &mut Session) {
    session.set_patient_name("Jane Doe").unwrap();
    session.set_initial_bp(BloodPressure::new(118, 76)).unwrap();
    session.set_initial_pr(72).unwrap();
}

fn tick_n(session: &mut Session, n: u32) -> Vec<SessionEvent> {
    (0..n).flat_map(|_| session.tick()).collect()
}

/// Session in standing with the timer running from 0:00.
fn standing_session() -> (Session, Arc<BufferedNotifier>) {
    let (mut session, notifier) = new_session();
    fill_setup(&mut session);
    session.start_supine().unwrap();
    session.set_lowest_supine_pr(65).unwrap();
    tick_n(&mut session, 400);
    session.start_standing().unwrap();
    session.record_measurement(78, NONE).unwrap();
    notifier.drain();
    (session, notifier)
}

#[test]
fn setup_requires_name_bp_and_pulse() {
    let (mut session, notifier) = new_session();

    let err = session.start_supine().unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert_eq!(err.to_string(), "Please enter patient name");
    assert_eq!(session.phase(), TestPhase::Setup);

    session.set_patient_name("Jane Doe").unwrap();
    session.set_initial_bp(BloodPressure { systolic: Some(118), diastolic: None }).unwrap();
    session.set_initial_pr(72).unwrap();
    assert_eq!(
        session.start_supine().unwrap_err().to_string(),
        "Please complete all baseline measurements"
    );

    session.set_initial_bp(BloodPressure::new(118, 76)).unwrap();
    session.start_supine().unwrap();
    assert_eq!(session.phase(), TestPhase::Supine);
    assert_eq!(session.timer().elapsed(), 0);
    assert!(session.timer().is_running());

    let errors = notifier
        .drain()
        .into_iter()
        .filter(|n| n.level == NoticeLevel::Error)
        .count();
    assert_eq!(errors, 2);
}

#[test]
fn blank_patient_name_is_rejected() {
    let (mut session, _) = new_session();
    fill_setup(&mut session);
    session.set_patient_name("   ").unwrap();
    assert!(session.start_supine().is_err());
}

#[test]
fn baseline_is_locked_after_setup() {
    let (mut session, _) = new_session();
    fill_setup(&mut session);
    session.start_supine().unwrap();

    assert!(matches!(
        session.set_initial_pr(80),
        Err(SessionError::InvalidTransition { phase: TestPhase::Supine, .. })
    ));
    assert_eq!(session.run().initial_pr, Some(72));
}

#[test]
fn supine_auto_flags_elapsed_after_600_ticks() {
    let (mut session, notifier) = new_session();
    fill_setup(&mut session);
    session.start_supine().unwrap();

    let events = tick_n(&mut session, 599);
    assert!(!events.iter().any(|e| matches!(e, SessionEvent::PhaseElapsed { .. })));
    assert!(!session.supine_elapsed());

    let events = session.tick();
    assert!(events.contains(&SessionEvent::PhaseElapsed { phase: TestPhase::Supine }));
    assert!(session.supine_elapsed());
    assert_eq!(session.timer().elapsed(), 600);
    assert!(!session.timer().is_running());
    assert_eq!(session.phase(), TestPhase::Supine);
    assert!(notifier.drain().iter().any(|n| n.message.contains("Supine phase complete")));
}

#[test]
fn auto_advance_enters_standing() {
    let (mut session, _) = session_with(ProtocolConfig {
        auto_advance_to_standing: true,
        ..ProtocolConfig::default()
    });
    fill_setup(&mut session);
    session.start_supine().unwrap();

    let events = tick_n(&mut session, 600);
    assert!(events.contains(&SessionEvent::PhaseChanged {
        from: TestPhase::Supine,
        to: TestPhase::Standing,
    }));
    assert_eq!(session.phase(), TestPhase::Standing);
    assert!(session.is_awaiting_initial_standing());
}

#[test]
fn each_tick_advances_exactly_one_second() {
    let (mut session, _) = new_session();
    fill_setup(&mut session);
    session.start_supine().unwrap();

    for expected in 1..=50 {
        session.tick();
        assert_eq!(session.timer().elapsed(), expected);
    }

    session.pause().unwrap();
    tick_n(&mut session, 10);
    assert_eq!(session.timer().elapsed(), 50);

    session.resume().unwrap();
    session.resume().unwrap();
    session.tick();
    assert_eq!(session.timer().elapsed(), 51);
}

#[test]
fn ticks_are_ignored_outside_timed_phases() {
    let (mut session, _) = new_session();
    assert!(session.tick().is_empty());
    assert_eq!(session.timer().elapsed(), 0);
}

#[test]
fn standing_without_lowest_supine_warns_but_proceeds() {
    let (mut session, notifier) = new_session();
    fill_setup(&mut session);
    session.start_supine().unwrap();
    tick_n(&mut session, 60);
    notifier.drain();

    session.start_standing().unwrap();
    assert_eq!(session.phase(), TestPhase::Standing);

    let notices = notifier.drain();
    assert!(notices
        .iter()
        .any(|n| n.level == NoticeLevel::Warn && n.message.contains("without lowest supine")));
    assert!(notices
        .iter()
        .any(|n| n.level == NoticeLevel::Warn && n.message.contains("Early advance at 1:00")));
}

#[test]
fn standing_holds_timer_until_first_reading() {
    let (mut session, _) = new_session();
    fill_setup(&mut session);
    session.start_supine().unwrap();
    tick_n(&mut session, 320);
    session.start_standing().unwrap();

    assert!(session.is_awaiting_initial_standing());
    assert_eq!(session.timer().elapsed(), 0);
    assert!(!session.timer().is_running());
    assert!(tick_n(&mut session, 5).is_empty());
    assert!(session.resume().is_err());
    assert!(session.add_missed_measurement("0:30", 90, NONE).is_err());

    let first = session.record_measurement(84, ["Dizziness"]).unwrap();
    assert_eq!(first.total_seconds, 0);
    assert!(!session.is_awaiting_initial_standing());
    assert!(session.timer().is_running());

    tick_n(&mut session, 30);
    let second = session.record_measurement(96, NONE).unwrap();
    assert_eq!(second.total_seconds, 30);
    assert_eq!(second.label(), "0:30");
}

#[test]
fn second_reading_in_same_second_conflicts() {
    let (mut session, _) = standing_session();
    tick_n(&mut session, 30);
    session.record_measurement(90, NONE).unwrap();

    let err = session.record_measurement(91, NONE).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Conflict);
    assert_eq!(session.run().ledger.get(30).unwrap().pulse_rate, 90);
}

#[test]
fn reminders_fire_on_boundaries_with_countdown() {
    let (mut session, notifier) = standing_session();

    let reminders: Vec<TimerEvent> = tick_n(&mut session, 60)
        .into_iter()
        .filter_map(|e| match e {
            SessionEvent::Reminder { event } => Some(event),
            _ => None,
        })
        .collect();

    let due: Vec<u32> = reminders
        .iter()
        .filter_map(|r| match r {
            TimerEvent::MeasurementDue { elapsed } => Some(*elapsed),
            _ => None,
        })
        .collect();
    assert_eq!(due, vec![30, 60]);

    let countdown: Vec<u32> = reminders
        .iter()
        .filter_map(|r| match r {
            TimerEvent::Countdown { seconds_remaining, .. } => Some(*seconds_remaining),
            _ => None,
        })
        .collect();
    assert_eq!(countdown, vec![5, 4, 3, 2, 1, 5, 4, 3, 2, 1]);

    let notices = notifier.drain();
    assert_eq!(
        notices
            .iter()
            .filter(|n| n.message == "Time to record heart rate measurement")
            .count(),
        2
    );
}

#[test]
fn next_measurement_countdown() {
    let (mut session, _) = standing_session();
    assert_eq!(session.next_measurement_in(), Some(30));
    tick_n(&mut session, 12);
    assert_eq!(session.next_measurement_in(), Some(18));
}

#[test]
fn completion_gates() {
    let (mut session, _) = standing_session();

    // 5 readings but under 5:00.
    for i in 1..=4 {
        tick_n(&mut session, 30);
        session.record_measurement(80 + i, NONE).unwrap();
    }
    assert_eq!(session.completion_option(), None);
    assert!(matches!(session.complete(), Err(SessionError::NotReady(_))));
    assert_eq!(session.phase(), TestPhase::Standing);

    tick_n(&mut session, 180);
    assert_eq!(session.timer().elapsed(), 300);
    assert_eq!(session.completion_option(), Some(CompletionOption::Early));

    for i in 5..=9 {
        tick_n(&mut session, 60);
        session.record_measurement(90 + i, NONE).unwrap();
    }
    assert_eq!(session.timer().elapsed(), 600);
    assert_eq!(session.run().ledger.len(), 10);
    assert_eq!(session.completion_option(), Some(CompletionOption::Full));

    assert_eq!(session.complete().unwrap(), CompletionReason::Completed);
    assert_eq!(session.phase(), TestPhase::Complete);
    assert!(!session.timer().is_running());
    assert_eq!(session.progress_percent(), 100.0);
}

#[test]
fn early_completion_records_reason() {
    let (mut session, _) = standing_session();
    for i in 1..=4 {
        tick_n(&mut session, 75);
        session.record_measurement(85 + i, NONE).unwrap();
    }
    assert_eq!(session.complete().unwrap(), CompletionReason::EarlyCompleted);
    assert_eq!(session.completion_reason(), Some(CompletionReason::EarlyCompleted));
}

#[test]
fn emergency_stop_from_supine_and_not_from_setup() {
    let (mut session, _) = new_session();
    assert!(session.emergency_stop().is_err());

    fill_setup(&mut session);
    session.start_supine().unwrap();
    tick_n(&mut session, 10);
    session.emergency_stop().unwrap();

    assert_eq!(session.phase(), TestPhase::Complete);
    assert_eq!(session.completion_reason(), Some(CompletionReason::EmergencyStop));
    assert!(session.tick().is_empty());
}

#[test]
fn ledger_editing_after_completion() {
    let (mut session, _) = standing_session();
    tick_n(&mut session, 30);
    session.record_measurement(95, NONE).unwrap();
    session.emergency_stop().unwrap();

    session.add_missed_measurement("1:00", 110, ["Palpitations"]).unwrap();
    session.edit_measurement(30, "0:45", 97, NONE).unwrap();
    session.edit_measurement(60, "1:00", 112, ["Palpitations"]).unwrap();

    let times: Vec<u32> = session.run().ledger.iter().map(|m| m.total_seconds).collect();
    assert_eq!(times, vec![0, 45, 60]);
    assert_eq!(session.run().ledger.get(60).unwrap().pulse_rate, 112);

    assert!(session.edit_measurement(45, "1:00", 100, NONE).is_err());
    assert!(session.add_missed_measurement("12:00", 100, NONE).is_err());
    session.delete_measurement(45).unwrap();
    assert!(session.delete_measurement(45).is_err());
    assert_eq!(session.run().ledger.len(), 2);
}

#[test]
fn readings_past_ten_minutes_stay_editable() {
    let (mut session, _) = standing_session();
    tick_n(&mut session, 660);
    let late = session.record_measurement(95, NONE).unwrap();
    assert_eq!(late.total_seconds, 660);

    let edited = session.edit_measurement(660, "11:00", 96, ["Dizziness"]).unwrap();
    assert_eq!(edited.total_seconds, 660);
    assert_eq!(session.run().ledger.get(660).unwrap().pulse_rate, 96);

    assert!(session.edit_measurement(660, "11:30", 96, NONE).is_err());
    assert!(session.run().ledger.contains(660));

    session.edit_measurement(660, "9:30", 94, NONE).unwrap();
    assert!(!session.run().ledger.contains(660));
    session.edit_measurement(570, "9:30", 93, NONE).unwrap();

    tick_n(&mut session, 30);
    session.record_measurement(99, NONE).unwrap();
    session.delete_measurement(690).unwrap();
    assert_eq!(session.run().ledger.len(), 2);
}

#[test]
fn stats_and_interpretation_follow_the_run() {
    let (mut session, _) = standing_session();
    tick_n(&mut session, 30);
    session.record_measurement(95, NONE).unwrap();
    tick_n(&mut session, 30);
    session.record_measurement(110, NONE).unwrap();

    let stats = session.stats();
    assert_eq!((stats.lowest, stats.highest, stats.delta), (65, 110, 45));
    assert_eq!(session.interpretation(), Interpretation::Positive);

    let series = session.chart_series(true);
    assert_eq!(series.len(), 5);
    assert!(series[0].is_pre_test && series[0].trend_value.is_some());
}

#[test]
fn reset_discards_the_run() {
    let (mut session, _) = standing_session();
    tick_n(&mut session, 45);
    session.reset();

    assert_eq!(session.phase(), TestPhase::Setup);
    assert_eq!(session.timer().elapsed(), 0);
    assert!(!session.timer().is_running());
    assert!(session.run().ledger.is_empty());
    assert!(session.run().patient_name.is_empty());
    assert_eq!(session.run().lowest_supine_pr, None);
    assert_eq!(session.run().test_date, jiff::civil::date(2025, 3, 14));
}

#[test]
fn progress_spans_phases() {
    let (mut session, _) = new_session();
    assert_eq!(session.progress_percent(), 0.0);
    fill_setup(&mut session);
    session.start_supine().unwrap();
    tick_n(&mut session, 300);
    assert!((session.progress_percent() - 37.5).abs() < 1e-9);
}

#[test]
fn invalid_config_is_rejected() {
    let notifier = Arc::new(BufferedNotifier::new());
    let config = ProtocolConfig {
        countdown_secs: 30,
        ..ProtocolConfig::default()
    };
    assert!(matches!(
        Session::new(config, notifier, jiff::civil::date(2025, 1, 1)),
        Err(SessionError::Config(_))
    ));
}
