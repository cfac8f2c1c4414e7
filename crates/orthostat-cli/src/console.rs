use orthostat_session::notifier::Notifier;

/// Prints operator notices to the terminal.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn info(&self, message: &str) {
        tracing::debug!(target: "orthostat::notice", "{message}");
        println!("  {message}");
    }

    fn warn(&self, message: &str) {
        tracing::debug!(target: "orthostat::notice", "{message}");
        println!("! {message}");
    }

    fn error(&self, message: &str) {
        tracing::debug!(target: "orthostat::notice", "{message}");
        eprintln!("✗ {message}");
    }
}
