use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};

use orthostat_core::clock::format_clock;
use orthostat_core::models::measurement::{COMMON_SYMPTOMS, Measurement};
use orthostat_core::models::phase::TestPhase;
use orthostat_export::capture::{capture_when_ready, SeriesChart};
use orthostat_export::chart::render_svg;
use orthostat_export::docx::generate_report;
use orthostat_export::naming::{chart_file_name, report_file_name, summary_file_name};
use orthostat_export::render::render_summary;
use orthostat_export::report::ReportData;
use orthostat_export::styles::DocumentStyles;
use orthostat_instruments::error::InstrumentError;
use orthostat_instruments::scoring::Answer;
use orthostat_instruments::{get_instrument, Instrument};
use orthostat_session::events::SessionEvent;
use orthostat_session::notifier::Notifier;
use orthostat_session::session::{CompletionOption, Session};

use crate::commands::{Command, HELP};
use crate::config::OrthostatConfig;

/// The console front end: turns parsed commands into session calls and
/// exports.
pub struct App {
    session: Session,
    config: OrthostatConfig,
    notifier: Arc<dyn Notifier>,
    compass: Box<dyn Instrument>,
    answers: Vec<Answer>,
}

impl App {
    pub fn new(
        config: OrthostatConfig,
        notifier: Arc<dyn Notifier>,
        test_date: jiff::civil::Date,
    ) -> eyre::Result<Self> {
        let session = Session::new(config.protocol.clone(), notifier.clone(), test_date)?;
        Ok(Self {
            session,
            config,
            notifier,
            compass: get_instrument("compass31")?,
            answers: Vec::new(),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    pub fn tick(&mut self) -> Vec<SessionEvent> {
        self.session.tick()
    }

    /// Run one command. `Ok(Some(text))` is output for the operator.
    ///
    /// Session failures have already been shown through the notifier when
    /// they come back as errors here.
    pub async fn execute(&mut self, command: Command) -> eyre::Result<Option<String>> {
        let s = &mut self.session;
        match command {
            Command::Name(name) => s.set_patient_name(&name)?,
            Command::Date(date) => s.set_test_date(date)?,
            Command::BloodPressure(bp) => s.set_initial_bp(bp)?,
            Command::PulseRate(rate) => s.set_initial_pr(rate)?,
            Command::Start => s.start_supine()?,
            Command::Lowest(rate) => s.set_lowest_supine_pr(rate)?,
            Command::Stand => s.start_standing()?,
            Command::Record {
                pulse_rate,
                symptoms,
            } => {
                s.record_measurement(pulse_rate, &symptoms)?;
            }
            Command::Missed {
                time,
                pulse_rate,
                symptoms,
            } => {
                s.add_missed_measurement(&time, pulse_rate, &symptoms)?;
            }
            Command::Edit {
                key,
                time,
                pulse_rate,
                symptoms,
            } => {
                s.edit_measurement(key, &time, pulse_rate, &symptoms)?;
            }
            Command::Delete(key) => {
                s.delete_measurement(key)?;
            }
            Command::Pause => s.pause()?,
            Command::Resume => s.resume()?,
            Command::Toggle => {
                s.toggle_timer()?;
            }
            Command::Complete => {
                s.complete()?;
                return Ok(Some(self.results_text()));
            }
            Command::Stop => s.emergency_stop()?,
            Command::Reset => s.reset(),
            Command::Status => return Ok(Some(self.status_text())),
            Command::List => return Ok(Some(self.list_text())),
            Command::Recent(n) => return Ok(Some(self.recent_text(n))),
            Command::Symptoms => return Ok(Some(COMMON_SYMPTOMS.join(", "))),
            Command::Summary => return self.export_summary().await.map(Some),
            Command::Chart => self.export_chart().await?,
            Command::Report => self.export_report().await?,
            Command::Compass => return Ok(Some(self.compass_text())),
            Command::Answer {
                question_id,
                option,
            } => return self.answer(question_id, option).map(Some),
            Command::Help => return Ok(Some(HELP.to_string())),
            Command::Quit => {}
        }
        Ok(None)
    }

    pub fn status_text(&self) -> String {
        let s = &self.session;
        let run = s.run();
        let mut out = format!(
            "Phase: {}   Timer: {} ({})\n",
            s.phase(),
            s.timer().display(),
            if s.timer().is_running() { "running" } else { "paused" }
        );
        out.push_str(&format!(
            "Patient: {}   Date: {}\n",
            if run.patient_name.is_empty() { "-" } else { run.patient_name.as_str() },
            run.test_date
        ));

        match s.phase() {
            TestPhase::Setup => {
                if let Err(missing) = run.check_setup() {
                    out.push_str(&format!("Setup incomplete: {missing}\n"));
                }
            }
            TestPhase::Supine => {
                let lowest = run
                    .lowest_supine_pr
                    .map(|r| format!("{r} bpm"))
                    .unwrap_or_else(|| "not recorded".to_string());
                out.push_str(&format!("Lowest supine HR: {lowest}\n"));
            }
            TestPhase::Standing => {
                if s.is_awaiting_initial_standing() {
                    out.push_str("Waiting for the initial standing heart rate\n");
                } else if let Some(next) = s.next_measurement_in() {
                    out.push_str(&format!("Next measurement in {next} s\n"));
                }
                match s.completion_option() {
                    Some(CompletionOption::Full) => out.push_str("Test can be completed\n"),
                    Some(CompletionOption::Early) => out.push_str("Early completion available\n"),
                    None => {}
                }
            }
            TestPhase::Complete => {}
        }

        out.push_str(&format!(
            "Measurements: {}   Progress: {:.0}%\n",
            run.ledger.len(),
            s.progress_percent()
        ));
        out.push_str(&self.results_text());
        out
    }

    fn results_text(&self) -> String {
        let stats = self.session.stats();
        format!(
            "Lowest: {} bpm   Highest: {} bpm   ΔHR: {} bpm   {}",
            stats.lowest,
            stats.highest,
            stats.delta,
            self.session.interpretation()
        )
    }

    fn list_text(&self) -> String {
        let ledger = &self.session.run().ledger;
        if ledger.is_empty() {
            return "No standing measurements".to_string();
        }
        ledger.iter().map(measurement_line).collect::<Vec<_>>().join("\n")
    }

    fn recent_text(&self, n: usize) -> String {
        let recent = self.session.recent(n);
        if recent.is_empty() {
            return "No standing measurements".to_string();
        }
        recent
            .into_iter()
            .map(measurement_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn report_data(&self) -> ReportData {
        ReportData::from_run(
            self.session.run(),
            self.session.config().positive_delta_bpm,
            self.config.clinic.clone(),
            &jiff::Zoned::now(),
        )
    }

    async fn output_dir(&self) -> eyre::Result<PathBuf> {
        let dir = self.config.output_dir();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Print the text summary, and save it when the patient is named.
    async fn export_summary(&self) -> eyre::Result<String> {
        let data = self.report_data();
        let text = render_summary(&data)?;
        if data.require_patient_name().is_ok() {
            let path = self
                .output_dir()
                .await?
                .join(summary_file_name(&data.patient_name, data.test_date));
            tokio::fs::write(&path, &text).await?;
            info!(path = %path.display(), "summary exported");
            self.notifier
                .info(&format!("Summary saved to {}", path.display()));
        }
        Ok(text)
    }

    async fn export_chart(&self) -> eyre::Result<()> {
        let data = self.report_data();
        data.require_patient_name()?;
        let capture = &self.config.capture;

        let png = capture_when_ready(&SeriesChart::new(data.series.clone()), capture).await?;
        let png_path = self.output_dir().await?.join(chart_file_name(
            "pots-chart",
            &data.patient_name,
            data.test_date,
        ));
        tokio::fs::write(&png_path, &png).await?;

        let svg = render_svg(&data.series, capture.width, capture.height)?;
        tokio::fs::write(png_path.with_extension("svg"), svg).await?;

        info!(path = %png_path.display(), bytes = png.len(), "chart exported");
        self.notifier
            .info(&format!("Chart saved to {}", png_path.display()));
        Ok(())
    }

    async fn export_report(&self) -> eyre::Result<()> {
        let data = self.report_data();
        data.require_patient_name()?;
        let options = &self.config.report;

        let chart = if options.include_chart {
            self.notifier.info("Capturing chart...");
            match capture_when_ready(&SeriesChart::new(data.series.clone()), &self.config.capture)
                .await
            {
                Ok(png) => Some(png),
                Err(e) => {
                    warn!(error = %e, "chart capture failed");
                    self.notifier
                        .warn("Could not capture chart, generating report without it");
                    None
                }
            }
        } else {
            None
        };

        let bytes = generate_report(&data, options, &DocumentStyles::default(), chart.as_deref())?;
        let path = self
            .output_dir()
            .await?
            .join(report_file_name(&data.patient_name, data.test_date));
        tokio::fs::write(&path, &bytes).await?;

        info!(path = %path.display(), bytes = bytes.len(), "report exported");
        self.notifier
            .info(&format!("Report saved to {}", path.display()));
        Ok(())
    }

    fn compass_text(&self) -> String {
        let mut out = String::new();
        for domain in self.compass.domains() {
            out.push_str(&format!("## {}\n", domain.name));
            for question in &domain.questions {
                let chosen = self
                    .answers
                    .iter()
                    .find(|a| a.question_id == question.id)
                    .map(|a| a.option);
                out.push_str(&format!("[{}] {}\n", question.id, question.text));
                for (i, option) in question.options.iter().enumerate() {
                    let number = i as i32 + 1;
                    let mark = if chosen == Some(number) { '*' } else { ' ' };
                    out.push_str(&format!("   {mark} {number}. {option}\n"));
                }
            }
            out.push('\n');
        }

        let progress = self.compass.progress(&self.answers);
        let score = self.compass.score(&self.answers);
        out.push_str(&format!(
            "Answered {}/{} ({:.0}%)\n",
            progress.answered,
            progress.total,
            progress.percent()
        ));
        for domain in &score.domains {
            out.push_str(&format!("{}: {}/{}\n", domain.name, domain.score, domain.max_score));
        }
        out.push_str(&format!("Total: {}/{}", score.total, score.max_total));
        out
    }

    fn answer(&mut self, question_id: String, option: i32) -> eyre::Result<String> {
        self.compass.question(&question_id)?;
        let answer = Answer {
            question_id,
            option,
        };
        if let Some(error) = self
            .compass
            .validate_answers(std::slice::from_ref(&answer))
            .into_iter()
            .next()
        {
            return Err(InstrumentError::from(error).into());
        }

        self.answers.retain(|a| a.question_id != answer.question_id);
        self.answers.push(answer);

        let progress = self.compass.progress(&self.answers);
        let score = self.compass.score(&self.answers);
        Ok(format!(
            "Answered {}/{}   {} score: {}/{}",
            progress.answered,
            progress.total,
            self.compass.name(),
            score.total,
            score.max_total
        ))
    }
}

fn measurement_line(m: &Measurement) -> String {
    if m.has_symptoms() {
        format!("{:>5}  {:>3} bpm  {}", m.label(), m.pulse_rate, m.symptoms)
    } else {
        format!("{:>5}  {:>3} bpm", m.label(), m.pulse_rate)
    }
}

/// A short line for periodic timer display, once a minute.
pub fn timer_line(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::Tick { phase, elapsed } if *elapsed % 60 == 0 => {
            Some(format!("[{phase} {}]", format_clock(*elapsed)))
        }
        _ => None,
    }
}
