use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Owns the one periodic tick task driving a session.
///
/// `start` always cancels the previous task and hands out a fresh
/// [`Ticks`] stream, so two tick streams never feed the same counter.
#[derive(Debug)]
pub struct TickSource {
    period: Duration,
    task: Option<JoinHandle<()>>,
}

impl TickSource {
    pub fn new(period: Duration) -> Self {
        Self { period, task: None }
    }

    /// One tick per second.
    pub fn per_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self) -> Ticks {
        self.stop();

        let (tx, rx) = mpsc::channel(1);
        let period = self.period;
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick of an interval completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(()).await.is_err() {
                    break;
                }
            }
        }));
        debug!(period_ms = period.as_millis() as u64, "tick source started");

        Ticks { rx }
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("tick source stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Receiving end of one [`TickSource::start`]. Ends once that source is
/// stopped or restarted.
#[derive(Debug)]
pub struct Ticks {
    rx: mpsc::Receiver<()>,
}

impl Ticks {
    pub async fn next(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}
