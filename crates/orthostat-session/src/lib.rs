//! orthostat-session
//!
//! The lean-test orchestrator: phase timer, reminder schedule, the
//! `setup → supine → standing → complete` state machine and the tick source
//! that drives it. Presentation is reached only through [`notifier::Notifier`].

pub mod config;
pub mod error;
pub mod events;
pub mod notifier;
pub mod session;
pub mod ticker;
pub mod timer;
