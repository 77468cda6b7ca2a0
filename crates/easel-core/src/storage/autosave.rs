//! Debounced auto-save scheduling.
//!
//! The timer holds no thread or callback: the owner polls it with the
//! current time and performs the save when it reports due. Dropping the
//! owner drops the timer, so nothing can fire against a torn-down canvas.

#[cfg(not(target_arch = "wasm32"))]
pub use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
pub use web_time::{Duration, Instant};

/// Default debounce delay in milliseconds.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 2000;

/// Cancellable debounce timer.
#[derive(Debug, Clone)]
pub struct AutoSaveTimer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Default for AutoSaveTimer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS))
    }
}

impl AutoSaveTimer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// (Re)start the countdown from `now`.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Clear the timer and return true if it was due at `now`.
    pub fn take_due(&mut self, now: Instant) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_delay() {
        let mut timer = AutoSaveTimer::new(Duration::from_millis(100));
        let start = Instant::now();
        assert!(!timer.is_due(start));

        timer.schedule(start);
        assert!(!timer.take_due(start + Duration::from_millis(99)));
        assert!(timer.take_due(start + Duration::from_millis(100)));
        assert!(!timer.is_pending());
        assert!(!timer.take_due(start + Duration::from_secs(10)));
    }

    #[test]
    fn test_rescheduling_debounces() {
        let mut timer = AutoSaveTimer::new(Duration::from_millis(100));
        let start = Instant::now();
        timer.schedule(start);
        timer.schedule(start + Duration::from_millis(80));
        assert!(!timer.is_due(start + Duration::from_millis(150)));
        assert!(timer.is_due(start + Duration::from_millis(180)));
    }

    #[test]
    fn test_cancel() {
        let mut timer = AutoSaveTimer::default();
        let start = Instant::now();
        timer.schedule(start);
        timer.cancel();
        assert!(!timer.is_due(start + Duration::from_secs(60)));
        assert_eq!(timer.delay(), Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS));
    }
}
