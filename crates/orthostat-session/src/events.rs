use serde::Serialize;

use orthostat_core::models::phase::TestPhase;

/// Advisory reminders derived from the standing-phase elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimerEvent {
    /// A sampling boundary was just crossed.
    MeasurementDue { elapsed: u32 },
    /// A boundary is `seconds_remaining` seconds away.
    Countdown { elapsed: u32, seconds_remaining: u32 },
}

/// What, if anything, the reminder schedule says at `elapsed`.
pub fn reminder_at(elapsed: u32, interval: u32, countdown: u32) -> Option<TimerEvent> {
    if elapsed == 0 || interval == 0 {
        return None;
    }
    let into_interval = elapsed % interval;
    if into_interval == 0 {
        return Some(TimerEvent::MeasurementDue { elapsed });
    }
    let seconds_remaining = interval - into_interval;
    (seconds_remaining <= countdown).then_some(TimerEvent::Countdown {
        elapsed,
        seconds_remaining,
    })
}

/// The full reminder sequence for one phase, produced lazily.
///
/// Finite: it ends at `until`. Build a new one to restart after a reset.
#[derive(Debug, Clone)]
pub struct Reminders {
    next: u32,
    until: u32,
    interval: u32,
    countdown: u32,
}

impl Reminders {
    pub fn new(until: u32, interval: u32, countdown: u32) -> Self {
        Self {
            next: 1,
            until,
            interval,
            countdown,
        }
    }
}

impl Iterator for Reminders {
    type Item = TimerEvent;

    fn next(&mut self) -> Option<Self::Item> {
        while self.next <= self.until {
            let elapsed = self.next;
            self.next += 1;
            if let Some(event) = reminder_at(elapsed, self.interval, self.countdown) {
                return Some(event);
            }
        }
        None
    }
}

/// Everything a single session tick can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Tick { phase: TestPhase, elapsed: u32 },
    Reminder { event: TimerEvent },
    /// The phase duration was reached.
    PhaseElapsed { phase: TestPhase },
    PhaseChanged { from: TestPhase, to: TestPhase },
}
