use std::sync::Arc;

use orthostat_cli::app::{timer_line, App};
use orthostat_cli::commands::parse_command;
use orthostat_cli::config::OrthostatConfig;
use orthostat_core::models::phase::TestPhase;
use orthostat_session::error::SessionError;
use orthostat_session::events::SessionEvent;
use orthostat_session::notifier::{BufferedNotifier, NoticeLevel};

fn app_in(dir: &std::path::Path) -> (App, Arc<BufferedNotifier>) {
    let mut config = OrthostatConfig::default();
    config.output_dir = Some(dir.to_path_buf());
    config.capture.width = 200;
    config.capture.height = 100;
    config.capture.scale = 1;

    let notifier = Arc::new(BufferedNotifier::new());
    let app = App::new(config, notifier.clone(), jiff::civil::date(2025, 3, 14)).unwrap();
    (app, notifier)
}

async fn run(app: &mut App, line: &str) -> eyre::Result<Option<String>> {
    app.execute(parse_command(line).unwrap()).await
}

fn ticks(app: &mut App, n: u32) {
    for _ in 0..n {
        app.tick();
    }
}

#[tokio::test]
async fn full_test_and_exports() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, notifier) = app_in(dir.path());

    for line in ["name Jane Doe", "bp 118/76", "pr 72", "start"] {
        run(&mut app, line).await.unwrap();
    }
    ticks(&mut app, 320);
    run(&mut app, "lowest 65").await.unwrap();
    run(&mut app, "stand").await.unwrap();
    assert_eq!(app.session().phase(), TestPhase::Standing);

    run(&mut app, "hr 80").await.unwrap();
    ticks(&mut app, 30);
    run(&mut app, "hr 100 Dizziness, Palpitations").await.unwrap();
    ticks(&mut app, 30);
    run(&mut app, "hr 112").await.unwrap();
    run(&mut app, "stop").await.unwrap();
    run(&mut app, "missed 1:30 115").await.unwrap();

    let recent = run(&mut app, "recent 2").await.unwrap().unwrap();
    assert_eq!(recent, " 1:30  115 bpm\n 1:00  112 bpm");
    let recent = run(&mut app, "recent").await.unwrap().unwrap();
    assert_eq!(recent.lines().count(), 4);
    assert!(recent.lines().last().unwrap().starts_with(" 0:00   80 bpm"));

    let status = run(&mut app, "status").await.unwrap().unwrap();
    assert!(status.contains("Phase: complete"));
    assert!(status.contains("ΔHR: 50 bpm   POSITIVE"));

    let summary = run(&mut app, "summary").await.unwrap().unwrap();
    assert!(summary.contains("0:30: 100 bpm (Dizziness, Palpitations)\n1:00: 112 bpm\n1:30: 115 bpm\n"));
    assert!(dir.path().join("POTS-Summary-Jane-Doe-2025-03-14.txt").exists());

    run(&mut app, "chart").await.unwrap();
    assert!(dir.path().join("pots-chart-Jane-Doe-2025-03-14.png").exists());
    assert!(dir.path().join("pots-chart-Jane-Doe-2025-03-14.svg").exists());

    run(&mut app, "report").await.unwrap();
    let report = std::fs::read(dir.path().join("POTS-Report-Jane-Doe-2025-03-14.docx")).unwrap();
    assert_eq!(&report[..2], b"PK");

    let notices = notifier.drain();
    assert!(!notices.iter().any(|n| n.level == NoticeLevel::Error));
    assert!(notices.iter().any(|n| n.message.starts_with("Report saved to")));
}

#[tokio::test]
async fn rejected_session_commands_are_session_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, notifier) = app_in(dir.path());

    let err = run(&mut app, "stand").await.unwrap_err();
    assert!(err.downcast_ref::<SessionError>().is_some());
    assert!(notifier.drain().iter().any(|n| n.level == NoticeLevel::Error));
}

#[tokio::test]
async fn exports_need_a_patient_name() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, _) = app_in(dir.path());

    assert!(run(&mut app, "report").await.is_err());
    assert!(run(&mut app, "chart").await.is_err());
    // The summary still prints, it just isn't filed.
    assert!(run(&mut app, "summary").await.unwrap().is_some());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn compass_answers_are_scored() {
    let dir = tempfile::tempdir().unwrap();
    let (mut app, _) = app_in(dir.path());

    run(&mut app, "answer oi_1 1").await.unwrap();
    let reply = run(&mut app, "answer oi_2 4").await.unwrap().unwrap();
    assert_eq!(reply, "Answered 2/7   COMPASS-31 score: 4/15");

    // Re-answering replaces the earlier choice.
    run(&mut app, "answer oi_2 1").await.unwrap();
    assert_eq!(app.answers().len(), 2);

    assert!(run(&mut app, "answer oi_3 9").await.is_err());
    assert!(run(&mut app, "answer xx_1 1").await.is_err());

    let form = run(&mut app, "compass").await.unwrap().unwrap();
    assert!(form.contains("## Orthostatic Intolerance"));
    assert!(form.contains("   * 1. Yes\n"));
    assert!(form.ends_with("Total: 1/15"));
}

#[test]
fn timer_line_once_a_minute() {
    let at = |elapsed| SessionEvent::Tick {
        phase: TestPhase::Supine,
        elapsed,
    };
    assert_eq!(timer_line(&at(120)).as_deref(), Some("[supine 2:00]"));
    assert_eq!(timer_line(&at(121)), None);
}
