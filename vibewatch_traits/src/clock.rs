use std::time::{Duration, Instant};

/// Source of monotonic time for the runner and the simulated sensors.
///
/// Monitor logic never reads a clock directly; the runner turns `since(epoch)`
/// into the timeline position it hands to every handler.
pub trait Clock {
    fn now(&self) -> Instant;

    /// Block (or pretend to) for `d`.
    fn sleep(&self, d: Duration);

    /// Timeline position relative to `epoch`; zero if `epoch` is in the future.
    fn since(&self, epoch: Instant) -> Duration {
        self.now().saturating_duration_since(epoch)
    }
}

/// Wall-clock time from `Instant::now`, sleeping the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, d: Duration) {
        if !d.is_zero() {
            std::thread::sleep(d);
        }
    }
}

#[cfg(any(test, feature = "test-clock"))]
pub mod test_clock {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Virtual clock: `sleep` moves time forward instantly. Clones share one
    /// timeline, so a runner and the simulated sensors it drives stay in step.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        offset_ns: Arc<AtomicU64>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset_ns: Arc::new(AtomicU64::new(0)),
            }
        }

        pub fn advance(&self, d: Duration) {
            let ns = u64::try_from(d.as_nanos()).unwrap_or(u64::MAX);
            let _ = self
                .offset_ns
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |cur| {
                    Some(cur.saturating_add(ns))
                });
        }

        /// Virtual time elapsed since construction.
        pub fn elapsed(&self) -> Duration {
            Duration::from_nanos(self.offset_ns.load(Ordering::SeqCst))
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            self.origin + self.elapsed()
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn sleeping_one_cycle_moves_the_timeline() {
            let clock = TestClock::new();
            let epoch = clock.now();
            clock.sleep(Duration::from_millis(33));
            clock.sleep(Duration::from_millis(15));
            assert_eq!(clock.since(epoch), Duration::from_millis(48));
        }

        #[test]
        fn clones_share_the_timeline() {
            let clock = TestClock::new();
            let sensor_view = clock.clone();
            sensor_view.advance(Duration::from_millis(500));
            assert_eq!(clock.elapsed(), Duration::from_millis(500));
        }

        #[test]
        fn epoch_in_the_future_reads_as_zero() {
            let clock = TestClock::new();
            let later = clock.now() + Duration::from_secs(1);
            assert_eq!(clock.since(later), Duration::ZERO);
        }
    }
}
