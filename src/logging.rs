//! Injected logging.
//!
//! The poller never prints on its own and never touches process-global
//! state: every diagnostic goes through the [`PollLogger`] supplied at
//! construction. [`ConsoleLogger`] (the default) writes plain lines to
//! stdout/stderr, [`LogFacade`] forwards to the [`log`](https://crates.io/crates/log)
//! crate so library users can route messages through their existing
//! subscriber, and [`SilentLogger`] discards everything.
//!
//! DEBUG messages are gated on the poller's `verbose` flag before they reach
//! the logger; timestamp prefixes are likewise applied by the poller, so
//! logger implementations only ever see the final message text.

use std::fmt::{self, Display, Formatter};

/// Severity of a poller diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogLevel {
    /// Progress messages (source opened, limit reached).
    Info,
    /// Extra detail, emitted only when the poller is verbose.
    Debug,
    /// Failures (source did not open, interruption).
    Error,
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Error => "ERROR",
        };
        write!(f, "{name}")
    }
}

/// Trait for receiving poller diagnostics.
///
/// Implementations must be [`Send`] and [`Sync`]: the logger is shared with
/// whatever thread drives the poller, and completion messages may race with
/// a supervisor thread inspecting the run.
pub trait PollLogger: Send + Sync {
    /// Handle one diagnostic message.
    fn log(&self, level: LogLevel, message: &str);
}

/// Print-style logger writing INFO/DEBUG to stdout and ERROR to stderr.
///
/// This is the default when no logger is configured.
#[derive(Debug, Default)]
pub struct ConsoleLogger;

impl PollLogger for ConsoleLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Error => eprintln!("{message}"),
            LogLevel::Info | LogLevel::Debug => println!("{message}"),
        }
    }
}

/// Forwards diagnostics to the `log` crate macros.
///
/// Use this to route poller output through an existing `log` subscriber
/// (`env_logger`, `tracing-log`, ...). Messages keep their poller severity:
/// INFO → `log::info!`, DEBUG → `log::debug!`, ERROR → `log::error!`.
#[derive(Debug, Default)]
pub struct LogFacade;

impl PollLogger for LogFacade {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info => log::info!("{message}"),
            LogLevel::Debug => log::debug!("{message}"),
            LogLevel::Error => log::error!("{message}"),
        }
    }
}

/// A logger that discards all diagnostics.
#[derive(Debug, Default)]
pub struct SilentLogger;

impl PollLogger for SilentLogger {
    fn log(&self, _level: LogLevel, _message: &str) {}
}
