use orthostat_session::ticker::{TickSource, Ticks};

/// Keeps exactly one tick stream alive while the session timer runs.
#[derive(Debug)]
pub struct TickDriver {
    source: TickSource,
    ticks: Option<Ticks>,
}

impl TickDriver {
    pub fn new(source: TickSource) -> Self {
        Self {
            source,
            ticks: None,
        }
    }

    /// Start or stop the stream to match the timer's running flag.
    pub fn sync(&mut self, running: bool) {
        match (running, self.ticks.is_some()) {
            (true, false) => self.ticks = Some(self.source.start()),
            (false, true) => {
                self.source.stop();
                self.ticks = None;
            }
            _ => {}
        }
    }

    /// Restart from a clean second boundary, e.g. after a phase change.
    pub fn restart(&mut self) {
        self.ticks = Some(self.source.start());
    }

    pub fn is_ticking(&self) -> bool {
        self.ticks.is_some()
    }

    /// Next tick, or never while stopped.
    pub async fn next(&mut self) -> Option<()> {
        match self.ticks.as_mut() {
            Some(ticks) => ticks.next().await,
            None => std::future::pending().await,
        }
    }
}
