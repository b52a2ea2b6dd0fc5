use crate::TimeSource;
use std::time::{SystemTime, UNIX_EPOCH};

/// The operating system's wall clock.
///
/// Every read is a `SystemTime::now()` call, so the value follows NTP steps
/// and manual adjustments, including steps backward. The generator detects
/// those and fails the affected call with
/// [`Error::ClockMovedBackwards`](crate::Error::ClockMovedBackwards).
///
/// Use [`MonotonicClock`](crate::MonotonicClock) if IDs must keep flowing
/// across clock adjustments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        // A clock set before 1970 reads as zero, which the generator then
        // rejects as being before its epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_EPOCH;

    #[test]
    fn reads_after_default_epoch() {
        let now = SystemClock.current_millis();
        assert!(now > DEFAULT_EPOCH.as_millis() as u64);
    }
}
