use std::time::Instant;

/// Operations slower than this are logged at `warn` when their timer drops.
pub const SLOW_OPERATION_MS: u128 = 1000;

/// Per-session stopwatch for provider rounds and tool invocations.
pub struct Timer<'a> {
    session_id: &'a str,
    operation: String,
    start: Instant,
}

impl<'a> Timer<'a> {
    pub fn start(session_id: &'a str, operation: impl Into<String>) -> Self {
        Self {
            session_id,
            operation: operation.into(),
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }

    pub fn log_elapsed(&self) {
        log::debug!(
            "[{}] {} completed in {}ms",
            self.session_id,
            self.operation,
            self.elapsed_ms()
        );
    }
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        let elapsed = self.elapsed_ms();
        if elapsed > SLOW_OPERATION_MS {
            log::warn!(
                "[{}] {} took {}ms (slow!)",
                self.session_id,
                self.operation,
                elapsed
            );
        }
    }
}
