// A minimal stderr logger for the `log` crate. Filtering is done via
// log::set_max_level, so no extra dependency is needed here.

use log::{self, Log};

/// The simplest possible logger that logs to stderr.
#[derive(Debug)]
pub struct Logger(());

const LOGGER: &Logger = &Logger(());

impl Logger {
    /// Install this logger as the global logger.
    pub fn init() -> Result<(), log::SetLoggerError> {
        log::set_logger(LOGGER)
    }
}

impl Log for Logger {
    fn enabled(&self, _: &log::Metadata<'_>) -> bool {
        // Filtering happens via the global max level.
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        eprintln!("{}|{}: {}", record.level(), record.target(), record.args());
    }

    fn flush(&self) {
        // eprintln! flushes on its own.
    }
}
