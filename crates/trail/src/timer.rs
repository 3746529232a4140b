use std::time::{Duration, Instant};

/// Single-slot cancellable activity window.
///
/// Arming stores one deadline; re-arming replaces it, so N moves inside the
/// window collapse into a single expiry that lands `window` after the last
/// move. Expiry is observed by polling; there is no background timer thread.
#[derive(Debug, Clone)]
pub struct ActivityTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl ActivityTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Cancels any pending deadline and schedules a fresh one.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// True while the window since the last `arm` has not elapsed.
    pub fn is_active(&self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) => now < deadline,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(250);

    #[test]
    fn inactive_until_armed() {
        let timer = ActivityTimer::new(WINDOW);
        assert!(!timer.is_active(Instant::now()));
    }

    #[test]
    fn expires_after_window() {
        let mut timer = ActivityTimer::new(WINDOW);
        let start = Instant::now();
        timer.arm(start);
        assert!(timer.is_active(start + Duration::from_millis(249)));
        assert!(!timer.is_active(start + WINDOW));
    }

    #[test]
    fn rearm_replaces_previous_deadline() {
        let mut timer = ActivityTimer::new(WINDOW);
        let start = Instant::now();
        // Three arms inside one window: the only expiry is 250ms after the last.
        timer.arm(start);
        timer.arm(start + Duration::from_millis(100));
        timer.arm(start + Duration::from_millis(200));

        assert!(timer.is_active(start + Duration::from_millis(449)));
        assert!(!timer.is_active(start + Duration::from_millis(450)));
    }

    #[test]
    fn cancel_clears_pending_deadline() {
        let mut timer = ActivityTimer::new(WINDOW);
        let start = Instant::now();
        timer.arm(start);
        timer.cancel();
        assert!(!timer.is_active(start + Duration::from_millis(1)));
    }
}
