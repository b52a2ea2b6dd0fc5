use crate::TimeSource;
use core::time::Duration;
use std::{
    sync::{
        Arc, OnceLock, Weak,
        atomic::{AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::{Instant, SystemTime, UNIX_EPOCH},
};

/// State shared between every clone of a [`MonotonicClock`] and its ticker.
#[derive(Debug)]
struct Ticker {
    /// Milliseconds elapsed since the clock was anchored.
    elapsed: AtomicU64,
    thread: OnceLock<JoinHandle<()>>,
}

/// A wall-clock-aligned time source that never goes backward.
///
/// The wall clock is sampled once at construction. From then on the reported
/// time advances with a monotonic timer (`Instant`), so NTP steps or manual
/// clock changes after startup are not observed. A generator driven by this
/// clock never fails with
/// [`Error::ClockMovedBackwards`](crate::Error::ClockMovedBackwards), at the
/// price of drifting from the wall clock if the host clock is corrected.
///
/// A background thread publishes the elapsed milliseconds into a shared
/// atomic, so reads avoid a syscall. Clones share the same ticker; the thread
/// exits once the last clone is dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    ticker: Arc<Ticker>,
    anchor_millis: u64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    /// Starts a new ticker anchored to the current wall-clock time.
    ///
    /// # Panics
    ///
    /// Panics if the operating system refuses to spawn the ticker thread.
    ///
    /// # Example
    ///
    /// ```
    /// use flakegen::{MonotonicClock, SystemClock, TimeSource};
    ///
    /// let clock = MonotonicClock::new();
    /// let wall = SystemClock.current_millis();
    ///
    /// // Both clocks start from the same wall time.
    /// assert!(clock.current_millis().abs_diff(wall) < 1_000);
    /// ```
    pub fn new() -> Self {
        let anchor = Instant::now();
        let anchor_millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |since| since.as_millis() as u64);

        let ticker = Arc::new(Ticker {
            elapsed: AtomicU64::new(0),
            thread: OnceLock::new(),
        });

        let weak = Arc::downgrade(&ticker);
        let handle = thread::spawn(move || tick_until_dropped(&weak, anchor));
        // Freshly created, so the cell is always empty here.
        let _ = ticker.thread.set(handle);

        Self {
            ticker,
            anchor_millis,
        }
    }
}

/// Publishes the milliseconds elapsed since `anchor` once per millisecond,
/// until every [`MonotonicClock`] sharing the ticker has been dropped.
fn tick_until_dropped(weak: &Weak<Ticker>, anchor: Instant) {
    let mut next_tick = 0;
    while let Some(ticker) = weak.upgrade() {
        // Sleep to an absolute deadline so oversleeping never accumulates.
        let deadline = anchor + Duration::from_millis(next_tick);
        if let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
            thread::sleep(remaining);
        }

        let elapsed = anchor.elapsed().as_millis() as u64;
        ticker.elapsed.store(elapsed, Ordering::Relaxed);
        next_tick = elapsed + 1;
    }
}

impl TimeSource for MonotonicClock {
    /// Returns the wall time captured at construction plus the monotonic
    /// time elapsed since.
    fn current_millis(&self) -> u64 {
        self.anchor_millis + self.ticker.elapsed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_goes_backward() {
        let clock = MonotonicClock::new();
        let mut last = clock.current_millis();
        for _ in 0..10_000 {
            let now = clock.current_millis();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn advances_with_real_time() {
        let clock = MonotonicClock::new();
        let before = clock.current_millis();
        thread::sleep(Duration::from_millis(20));
        assert!(clock.current_millis() > before);
    }

    #[test]
    fn clones_share_the_ticker() {
        let clock = MonotonicClock::new();
        let other = clock.clone();
        assert!(Arc::ptr_eq(&clock.ticker, &other.ticker));
        assert_eq!(clock.anchor_millis, other.anchor_millis);
    }
}
