use std::time::{Duration, Instant};

pub const COPIED_MESSAGE: &str = "Copied to clipboard!";
pub const TOAST_DURATION: Duration = Duration::from_millis(2000);

/// Transient confirmation with a fixed visible duration.
///
/// Re-triggering while visible restarts the timer instead of stacking.
#[derive(Debug, Clone, Default)]
pub struct Toast {
    visible_until: Option<Instant>,
}

impl Toast {
    pub fn trigger(&mut self, now: Instant) {
        self.visible_until = Some(now + TOAST_DURATION);
    }

    pub fn is_visible(&self, now: Instant) -> bool {
        self.visible_until.is_some_and(|until| now < until)
    }

    pub fn tick(&mut self, now: Instant) {
        if self.visible_until.is_some_and(|until| now >= until) {
            self.visible_until = None;
        }
    }

    pub fn message(&self) -> &'static str {
        COPIED_MESSAGE
    }
}
