//! Exclusive access to captured `log` records.

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use log::Level;
use logtest::Logger;
use rstest::fixture;

/// Guard over the process-wide [`Logger`].
///
/// Only one test holds the guard at a time, so captured records are not
/// interleaved between tests in the same binary.
pub struct LogCapture {
    guard: MutexGuard<'static, Logger>,
}

impl LogCapture {
    /// Acquire the logger and discard anything captured earlier.
    #[must_use]
    pub fn new() -> Self {
        static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

        let logger = LOGGER.get_or_init(|| Mutex::new(Logger::start()));
        let mut guard = logger.lock().unwrap_or_else(PoisonError::into_inner);
        while guard.pop().is_some() {}
        Self { guard }
    }

    /// Drain captured records, returning the messages logged at `level`
    /// that contain `needle`.
    pub fn drain_matching(&mut self, level: Level, needle: &str) -> Vec<String> {
        let mut found = Vec::new();
        while let Some(record) = self.guard.pop() {
            if record.level() == level && record.args().contains(needle) {
                found.push(record.args().to_owned());
            }
        }
        found
    }
}

impl Default for LogCapture {
    fn default() -> Self { Self::new() }
}

#[allow(
    unused_braces,
    reason = "rustc false positive for single line rstest fixtures"
)]
#[fixture]
pub fn logs() -> LogCapture { LogCapture::new() }
