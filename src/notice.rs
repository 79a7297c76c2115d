//! Suppression of repeated notices.
//!
//! A batch that hits the same failure for every track would otherwise log the
//! same line hundreds of times. `NoticeDeduper` lets a message through, then
//! swallows identical messages until the configured window has passed.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::NoticeConfig;

pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

pub struct NoticeDeduper<C: Clock = SystemClock> {
    clock: C,
    window: Duration,
    last: Mutex<Option<(String, Instant)>>,
}

impl NoticeDeduper<SystemClock> {
    pub fn new(config: &NoticeConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl Default for NoticeDeduper<SystemClock> {
    fn default() -> Self {
        Self::new(&NoticeConfig::default())
    }
}

impl<C: Clock> NoticeDeduper<C> {
    pub fn with_clock(config: &NoticeConfig, clock: C) -> Self {
        Self {
            clock,
            window: config.window,
            last: Mutex::new(None),
        }
    }

    /// Returns false if `message` repeats the last emitted one within the window.
    pub fn should_emit(&self, message: &str) -> bool {
        let now = self.clock.now();
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some((previous, at)) = last.as_ref() {
            if previous == message && now.duration_since(*at) < self.window {
                return false;
            }
        }
        *last = Some((message.to_string(), now));
        true
    }
}

/// "{context}: {message}", or the bare message without a context.
pub fn format_notice(context: Option<&str>, message: &str) -> String {
    match context {
        Some(ctx) if !ctx.is_empty() => format!("{}: {}", ctx, message),
        _ => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// Clock advanced by hand.
    #[derive(Clone)]
    struct ManualClock {
        start: Instant,
        offset: Arc<Mutex<Duration>>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                start: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        fn advance(&self, by: Duration) {
            *self.offset.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.start + *self.offset.lock().unwrap()
        }
    }

    fn deduper(clock: &ManualClock) -> NoticeDeduper<ManualClock> {
        NoticeDeduper::with_clock(&NoticeConfig::default(), clock.clone())
    }

    #[test]
    fn test_repeat_within_window_is_suppressed() {
        let clock = ManualClock::new();
        let notices = deduper(&clock);
        assert!(notices.should_emit("lookup failed"));
        clock.advance(Duration::from_millis(1000));
        assert!(!notices.should_emit("lookup failed"));
    }

    #[test]
    fn test_repeat_after_window_is_emitted() {
        let clock = ManualClock::new();
        let notices = deduper(&clock);
        assert!(notices.should_emit("lookup failed"));
        clock.advance(Duration::from_millis(1500));
        assert!(notices.should_emit("lookup failed"));
    }

    #[test]
    fn test_different_message_resets() {
        let clock = ManualClock::new();
        let notices = deduper(&clock);
        assert!(notices.should_emit("a"));
        assert!(notices.should_emit("b"));
        // "a" is no longer the last message
        assert!(notices.should_emit("a"));
    }

    #[test]
    fn test_format_notice() {
        assert_eq!(format_notice(Some("Artist lookup"), "locked"), "Artist lookup: locked");
        assert_eq!(format_notice(None, "locked"), "locked");
        assert_eq!(format_notice(Some(""), "locked"), "locked");
    }
}
