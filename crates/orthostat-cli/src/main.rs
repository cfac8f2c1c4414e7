use std::sync::Arc;

use eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use orthostat_cli::app::{timer_line, App};
use orthostat_cli::commands::{parse_command, Command, ParseError};
use orthostat_cli::config;
use orthostat_cli::console::ConsoleNotifier;
use orthostat_cli::driver::TickDriver;
use orthostat_session::error::SessionError;
use orthostat_session::ticker::TickSource;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let config = config::load_config()?;
    let mut app = App::new(
        config,
        Arc::new(ConsoleNotifier),
        jiff::Zoned::now().date(),
    )?;
    let mut driver = TickDriver::new(TickSource::per_second());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("NASA 10-Minute Lean Test. Type 'help' for commands.");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => command,
                    Err(ParseError::Empty) => continue,
                    Err(e) => {
                        eprintln!("✗ {e}");
                        continue;
                    }
                };

                let phase = app.session().phase();
                match app.execute(command).await {
                    Ok(Some(output)) => println!("{output}"),
                    Ok(None) => {}
                    // Already shown by the notifier.
                    Err(e) if e.downcast_ref::<SessionError>().is_some() => {}
                    Err(e) => eprintln!("✗ {e}"),
                }
                if app.session().phase() != phase {
                    driver.restart();
                }
            }
            Some(()) = driver.next() => {
                for event in app.tick() {
                    tracing::debug!(?event, "session event");
                    if let Some(line) = timer_line(&event) {
                        println!("{line}");
                    }
                }
            }
        }
        driver.sync(app.session().timer().is_running());
    }

    driver.sync(false);
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if std::env::var("ORTHOSTAT_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}
