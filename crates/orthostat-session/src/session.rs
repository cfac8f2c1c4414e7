use std::sync::Arc;

use tracing::{info, warn};

use orthostat_core::clock::{format_clock, parse_clock, parse_elapsed};
use orthostat_core::error::CoreError;
use orthostat_core::models::blood_pressure::BloodPressure;
use orthostat_core::models::chart::ChartPoint;
use orthostat_core::models::measurement::{validate_pulse_rate, Measurement};
use orthostat_core::models::phase::{CompletionReason, TestPhase};
use orthostat_core::models::stats::{Interpretation, TestStats};
use orthostat_core::models::test_run::TestRun;
use orthostat_core::stats::interpret;

use crate::config::ProtocolConfig;
use crate::error::SessionError;
use crate::events::{reminder_at, SessionEvent, TimerEvent};
use crate::notifier::Notifier;
use crate::timer::PhaseTimer;

/// Which completion affordance the standing phase currently offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOption {
    /// Phase duration reached with the full measurement count.
    Full,
    /// Early-completion gate met.
    Early,
}

/// Orchestrates one lean test: owns the [`TestRun`] and the [`PhaseTimer`]
/// and is the only thing that mutates them.
///
/// Every command either succeeds or leaves state untouched; failures are
/// returned and also reported through the notifier.
pub struct Session {
    run: TestRun,
    phase: TestPhase,
    timer: PhaseTimer,
    /// Standing entered but the first standing reading not yet taken; the
    /// timer is held at zero until then.
    awaiting_initial_standing: bool,
    supine_elapsed: bool,
    completion: Option<CompletionReason>,
    config: ProtocolConfig,
    notifier: Arc<dyn Notifier>,
}

impl Session {
    pub fn new(
        config: ProtocolConfig,
        notifier: Arc<dyn Notifier>,
        test_date: jiff::civil::Date,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            run: TestRun::new(test_date),
            phase: TestPhase::Setup,
            timer: PhaseTimer::new(config.phase_duration_secs),
            awaiting_initial_standing: false,
            supine_elapsed: false,
            completion: None,
            config,
            notifier,
        })
    }

    /// A session dated today in the system time zone.
    pub fn today(config: ProtocolConfig, notifier: Arc<dyn Notifier>) -> Result<Self, SessionError> {
        Self::new(config, notifier, jiff::Zoned::now().date())
    }

    pub fn set_patient_name(&mut self, name: &str) -> Result<(), SessionError> {
        self.attempt(|s| {
            s.require_phase(&[TestPhase::Setup], "change patient details")?;
            s.run.patient_name = name.trim().to_string();
            Ok(())
        })
    }

    pub fn set_test_date(&mut self, date: jiff::civil::Date) -> Result<(), SessionError> {
        self.attempt(|s| {
            s.require_phase(&[TestPhase::Setup], "change the test date")?;
            s.run.test_date = date;
            Ok(())
        })
    }

    pub fn set_initial_bp(&mut self, bp: BloodPressure) -> Result<(), SessionError> {
        self.attempt(|s| {
            s.require_phase(&[TestPhase::Setup], "change baseline blood pressure")?;
            s.run.initial_bp = bp;
            Ok(())
        })
    }

    pub fn set_initial_pr(&mut self, pulse_rate: u32) -> Result<(), SessionError> {
        self.attempt(|s| {
            s.require_phase(&[TestPhase::Setup], "change the initial pulse rate")?;
            s.run.initial_pr = Some(validate_pulse_rate(pulse_rate)?);
            Ok(())
        })
    }

    /// Record the lowest heart rate observed during supine rest.
    pub fn set_lowest_supine_pr(&mut self, pulse_rate: u32) -> Result<(), SessionError> {
        self.attempt(|s| {
            s.require_phase(&[TestPhase::Supine], "record the lowest supine pulse rate")?;
            s.run.lowest_supine_pr = Some(validate_pulse_rate(pulse_rate)?);
            s.notifier
                .info(&format!("Lowest supine HR recorded: {pulse_rate} bpm"));
            Ok(())
        })
    }

    /// `setup → supine`, once name, blood pressure and initial pulse are in.
    pub fn start_supine(&mut self) -> Result<(), SessionError> {
        self.attempt(|s| {
            s.require_phase(&[TestPhase::Setup], "start supine rest")?;
            if let Err(missing) = s.run.check_setup() {
                let message = match missing {
                    CoreError::MissingField(field) if field == "patient name" => {
                        "Please enter patient name"
                    }
                    _ => "Please complete all baseline measurements",
                };
                return Err(SessionError::NotReady(message.to_string()));
            }

            s.enter(TestPhase::Supine);
            s.supine_elapsed = false;
            s.timer.reset();
            s.timer.start();
            s.notifier.info(&format!(
                "Starting {}-minute supine rest phase",
                s.config.phase_duration_secs / 60
            ));
            Ok(())
        })
    }

    /// `supine → standing`. Never blocked by a missing lowest supine
    /// reading, but warns about it and about a short rest.
    pub fn start_standing(&mut self) -> Result<(), SessionError> {
        self.attempt(|s| {
            s.require_phase(&[TestPhase::Supine], "start the standing phase")?;
            s.report_supine_duration();
            s.begin_standing();
            Ok(())
        })
    }

    /// Finish a standing phase that has met one of the completion gates.
    pub fn complete(&mut self) -> Result<CompletionReason, SessionError> {
        self.attempt(|s| {
            s.require_phase(&[TestPhase::Standing], "complete the test")?;
            let reason = match s.completion_option() {
                Some(CompletionOption::Full) => CompletionReason::Completed,
                Some(CompletionOption::Early) => CompletionReason::EarlyCompleted,
                None => {
                    return Err(SessionError::NotReady(format!(
                        "completing needs at least {} measurements and {} elapsed",
                        s.config.early_completion_min_measurements,
                        format_clock(s.config.early_completion_secs),
                    )));
                }
            };

            s.finish(reason);
            s.notifier.info("Test completed successfully!");
            Ok(reason)
        })
    }

    /// Abort from supine or standing straight to `complete`.
    pub fn emergency_stop(&mut self) -> Result<(), SessionError> {
        self.attempt(|s| {
            s.require_phase(&[TestPhase::Supine, TestPhase::Standing], "stop the test")?;
            s.finish(CompletionReason::EmergencyStop);
            s.notifier.warn("Test stopped by operator");
            Ok(())
        })
    }

    /// Discard the run and return to `setup`. Allowed from any phase.
    pub fn reset(&mut self) {
        let test_date = self.run.test_date;
        self.run = TestRun::new(test_date);
        self.timer.reset();
        self.awaiting_initial_standing = false;
        self.supine_elapsed = false;
        self.completion = None;
        self.enter(TestPhase::Setup);
        self.notifier.info("Test reset - ready for new patient");
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        self.attempt(|s| {
            s.require_timer_control("pause the timer")?;
            s.timer.pause();
            Ok(())
        })
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        self.attempt(|s| {
            s.require_timer_control("resume the timer")?;
            s.timer.start();
            Ok(())
        })
    }

    /// Flip running/paused; returns whether the timer now runs.
    pub fn toggle_timer(&mut self) -> Result<bool, SessionError> {
        self.attempt(|s| {
            s.require_timer_control("pause or resume the timer")?;
            Ok(s.timer.toggle())
        })
    }

    /// Advance the timer by one second and apply phase side effects.
    ///
    /// Does nothing unless a timed phase is running. Each call moves the
    /// counter by at most one.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        if !self.phase.is_timed() {
            return Vec::new();
        }
        let Some(elapsed) = self.timer.tick() else {
            return Vec::new();
        };

        let mut events = vec![SessionEvent::Tick {
            phase: self.phase,
            elapsed,
        }];

        match self.phase {
            TestPhase::Supine => {
                if elapsed >= self.config.phase_duration_secs && !self.supine_elapsed {
                    self.supine_elapsed = true;
                    self.timer.pause();
                    events.push(SessionEvent::PhaseElapsed {
                        phase: TestPhase::Supine,
                    });
                    self.notifier
                        .info("Supine phase complete! Ready to start standing phase.");
                    info!(elapsed, "supine rest elapsed");

                    if self.config.auto_advance_to_standing {
                        self.begin_standing();
                        events.push(SessionEvent::PhaseChanged {
                            from: TestPhase::Supine,
                            to: TestPhase::Standing,
                        });
                    }
                }
            }
            TestPhase::Standing => {
                if let Some(reminder) = reminder_at(
                    elapsed,
                    self.config.measurement_interval_secs,
                    self.config.countdown_secs,
                ) {
                    match reminder {
                        TimerEvent::MeasurementDue { .. } => {
                            self.notifier.info("Time to record heart rate measurement")
                        }
                        TimerEvent::Countdown {
                            seconds_remaining, ..
                        } => self.notifier.warn(&format!(
                            "Measurement due in {seconds_remaining} seconds"
                        )),
                    }
                    events.push(SessionEvent::Reminder { event: reminder });
                }
                if elapsed == self.config.phase_duration_secs {
                    events.push(SessionEvent::PhaseElapsed {
                        phase: TestPhase::Standing,
                    });
                    self.notifier.info(&format!(
                        "Standing phase reached {}",
                        format_clock(elapsed)
                    ));
                }
            }
            TestPhase::Setup | TestPhase::Complete => {}
        }

        events
    }

    /// Record a live standing reading at the current timer value.
    ///
    /// The first reading after entering standing is stored at `0:00` and
    /// starts the timer.
    pub fn record_measurement<I, S>(
        &mut self,
        pulse_rate: u32,
        symptoms: I,
    ) -> Result<Measurement, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.attempt(|s| {
            s.require_phase(&[TestPhase::Standing], "record a measurement")?;

            if s.awaiting_initial_standing {
                let measurement = s.run.ledger.add(0, pulse_rate, symptoms)?.clone();
                s.awaiting_initial_standing = false;
                s.timer.reset();
                s.timer.start();
                info!(pulse_rate, "initial standing heart rate recorded, timer started");
                s.notifier.info(&format!(
                    "Initial standing HR recorded: {pulse_rate} bpm - timer started"
                ));
                return Ok(measurement);
            }

            let at = s.timer.elapsed();
            let measurement = s.run.ledger.add(at, pulse_rate, symptoms)?.clone();
            s.notifier
                .info(&format!("Measurement recorded: {pulse_rate} bpm"));
            Ok(measurement)
        })
    }

    /// Backfill a reading for a missed interval at an `M:SS` time.
    pub fn add_missed_measurement<I, S>(
        &mut self,
        time: &str,
        pulse_rate: u32,
        symptoms: I,
    ) -> Result<Measurement, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.attempt(|s| {
            s.require_ledger_edit("add a missed measurement")?;
            let at = parse_clock(time)?;
            let measurement = s.run.ledger.add(at, pulse_rate, symptoms)?.clone();
            s.notifier.info("Measurement added successfully");
            Ok(measurement)
        })
    }

    /// Edit the reading stored at `key`. A changed time moves the entry.
    ///
    /// Keeping the stored time is always allowed, even past the test
    /// length; a new time must be a valid backfill time.
    pub fn edit_measurement<I, S>(
        &mut self,
        key: u32,
        time: &str,
        pulse_rate: u32,
        symptoms: I,
    ) -> Result<Measurement, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.attempt(|s| {
            s.require_ledger_edit("edit a measurement")?;
            let at = match parse_elapsed(time)? {
                unchanged if unchanged == key => unchanged,
                _ => parse_clock(time)?,
            };
            let measurement = if at == key {
                s.run.ledger.update(key, pulse_rate, symptoms)?.clone()
            } else {
                s.run
                    .ledger
                    .add_or_relocate(at, pulse_rate, symptoms, Some(key))?
                    .clone()
            };
            s.notifier.info("Measurement updated successfully");
            Ok(measurement)
        })
    }

    pub fn delete_measurement(&mut self, key: u32) -> Result<Measurement, SessionError> {
        self.attempt(|s| {
            s.require_ledger_edit("delete a measurement")?;
            let removed = s.run.ledger.remove(key)?;
            s.notifier.info("Measurement deleted");
            Ok(removed)
        })
    }

    pub fn phase(&self) -> TestPhase {
        self.phase
    }

    pub fn run(&self) -> &TestRun {
        &self.run
    }

    pub fn timer(&self) -> &PhaseTimer {
        &self.timer
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn is_awaiting_initial_standing(&self) -> bool {
        self.awaiting_initial_standing
    }

    pub fn supine_elapsed(&self) -> bool {
        self.supine_elapsed
    }

    pub fn completion_reason(&self) -> Option<CompletionReason> {
        self.completion
    }

    pub fn stats(&self) -> TestStats {
        self.run.stats()
    }

    pub fn interpretation(&self) -> Interpretation {
        interpret(&self.stats(), self.config.positive_delta_bpm)
    }

    pub fn chart_series(&self, with_trend: bool) -> Vec<ChartPoint> {
        self.run.chart_series(with_trend)
    }

    pub fn recent(&self, n: usize) -> Vec<&Measurement> {
        self.run.ledger.recent(n)
    }

    /// Seconds to the next sampling boundary while standing.
    pub fn next_measurement_in(&self) -> Option<u32> {
        if self.phase != TestPhase::Standing || self.awaiting_initial_standing {
            return None;
        }
        let interval = self.config.measurement_interval_secs;
        Some(interval - self.timer.elapsed() % interval)
    }

    /// Which completion affordance, if any, is currently available.
    pub fn completion_option(&self) -> Option<CompletionOption> {
        if self.phase != TestPhase::Standing {
            return None;
        }
        let elapsed = self.timer.elapsed();
        let count = self.run.ledger.len();
        if elapsed >= self.config.phase_duration_secs
            && count >= self.config.full_completion_min_measurements
        {
            Some(CompletionOption::Full)
        } else if elapsed >= self.config.early_completion_secs
            && count >= self.config.early_completion_min_measurements
        {
            Some(CompletionOption::Early)
        } else {
            None
        }
    }

    /// Whole-protocol progress: supine covers 25–50 %, standing 50–100 %.
    pub fn progress_percent(&self) -> f64 {
        let phase_share = self.timer.progress_percent() / 100.0;
        match self.phase {
            TestPhase::Setup => 0.0,
            TestPhase::Supine => 25.0 + phase_share * 25.0,
            TestPhase::Standing => 50.0 + phase_share * 50.0,
            TestPhase::Complete => 100.0,
        }
    }

    /// Run a command, surfacing any failure to the operator.
    fn attempt<T>(
        &mut self,
        command: impl FnOnce(&mut Self) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let result = command(self);
        if let Err(e) = &result {
            warn!(phase = %self.phase, error = %e, "action rejected");
            self.notifier.error(&e.to_string());
        }
        result
    }

    fn require_phase(&self, allowed: &[TestPhase], action: &'static str) -> Result<(), SessionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                phase: self.phase,
                action,
            })
        }
    }

    fn require_timer_control(&self, action: &'static str) -> Result<(), SessionError> {
        self.require_phase(&[TestPhase::Supine, TestPhase::Standing], action)?;
        if self.awaiting_initial_standing {
            return Err(SessionError::NotReady(
                "record the initial standing heart rate to start the timer".to_string(),
            ));
        }
        Ok(())
    }

    fn require_ledger_edit(&self, action: &'static str) -> Result<(), SessionError> {
        self.require_phase(&[TestPhase::Standing, TestPhase::Complete], action)?;
        if self.awaiting_initial_standing {
            return Err(SessionError::NotReady(
                "record the initial standing heart rate first".to_string(),
            ));
        }
        Ok(())
    }

    fn enter(&mut self, next: TestPhase) {
        info!(from = %self.phase, to = %next, "phase transition");
        self.phase = next;
    }

    fn begin_standing(&mut self) {
        if self.run.lowest_supine_pr.is_none() {
            self.notifier
                .warn("Standing phase started without lowest supine HR recorded");
        }
        self.enter(TestPhase::Standing);
        self.timer.reset();
        self.awaiting_initial_standing = true;
        self.notifier.info(
            "Standing phase started - record the initial standing heart rate to start the timer",
        );
    }

    fn report_supine_duration(&self) {
        let elapsed = self.timer.elapsed();
        let at = format_clock(elapsed);
        if elapsed < self.config.early_advance_warning_secs {
            self.notifier.warn(&format!(
                "Early advance at {at} - typically recommend {}+ minutes supine",
                self.config.early_advance_warning_secs / 60
            ));
        } else if elapsed < self.config.recommended_supine_secs {
            self.notifier.info(&format!(
                "Supine phase completed at {at} - standard protocol recommends {}-{} minutes",
                self.config.recommended_supine_secs / 60,
                self.config.phase_duration_secs / 60
            ));
        } else {
            self.notifier
                .info(&format!("Supine phase completed at {at}"));
        }
    }

    fn finish(&mut self, reason: CompletionReason) {
        self.timer.pause();
        self.awaiting_initial_standing = false;
        self.completion = Some(reason);
        self.enter(TestPhase::Complete);
        info!(
            ?reason,
            measurements = self.run.ledger.len(),
            delta = self.stats().delta,
            "test finished"
        );
    }
}

