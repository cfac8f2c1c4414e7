use orthostat_core::clock::format_clock;

/// A whole-second elapsed counter with a running flag.
///
/// The timer knows nothing about phases: the session calls [`tick`] once per
/// elapsed second and reacts to the returned value.
///
/// [`tick`]: PhaseTimer::tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTimer {
    elapsed: u32,
    running: bool,
    duration_secs: u32,
}

impl PhaseTimer {
    pub fn new(duration_secs: u32) -> Self {
        Self {
            elapsed: 0,
            running: false,
            duration_secs,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop counting; the elapsed value is kept.
    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    pub fn reset(&mut self) {
        self.elapsed = 0;
        self.running = false;
    }

    /// Advance by exactly one second. Returns the new elapsed value, or
    /// `None` when paused.
    pub fn tick(&mut self) -> Option<u32> {
        if !self.running {
            return None;
        }
        self.elapsed = self.elapsed.saturating_add(1);
        Some(self.elapsed)
    }

    pub fn elapsed(&self) -> u32 {
        self.elapsed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    pub fn minutes(&self) -> u32 {
        self.elapsed / 60
    }

    pub fn seconds(&self) -> u32 {
        self.elapsed % 60
    }

    /// `M:SS` for display.
    pub fn display(&self) -> String {
        format_clock(self.elapsed)
    }

    /// Share of the phase duration elapsed, clamped to `[0, 100]`.
    pub fn progress_percent(&self) -> f64 {
        if self.duration_secs == 0 {
            return 100.0;
        }
        (f64::from(self.elapsed) / f64::from(self.duration_secs) * 100.0).clamp(0.0, 100.0)
    }

    pub fn has_reached_duration(&self) -> bool {
        self.elapsed >= self.duration_secs
    }
}

impl Default for PhaseTimer {
    fn default() -> Self {
        Self::new(600)
    }
}
