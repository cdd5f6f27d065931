use std::time::{Duration, Instant};

/// Start-of-lineage clock for encoders.
///
/// The clock is captured once, when the root encoder is built, and copied
/// into every clone. Each rendered entry shows the time elapsed since that
/// moment rather than the wall-clock time of the entry.
///
/// # Examples
///
/// ```
/// # use pretty_log::clock::StartClock;
/// let clock = StartClock::new();
/// let copy = clock;
///
/// // Copies share the same start
/// assert_eq!(clock.start(), copy.start());
/// assert!(copy.elapsed() >= std::time::Duration::ZERO);
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StartClock {
    start: Instant,
}

impl StartClock {
    /// Captures the current instant as the start.
    #[inline]
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Builds a clock from a known start, mostly useful in tests.
    pub const fn starting_at(start: Instant) -> Self {
        Self { start }
    }

    pub fn start(&self) -> Instant {
        self.start
    }

    /// Time since the start. Monotonic, never negative.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for StartClock {
    fn default() -> Self {
        Self::new()
    }
}
