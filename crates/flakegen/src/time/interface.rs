use core::time::Duration;

/// Default epoch: Thursday, December 31, 2020 00:00:00 UTC+8
/// (`2020-12-30T16:00:00Z`).
pub const DEFAULT_EPOCH: Duration = Duration::from_millis(1_609_344_000_000);

/// Twitter epoch: Thursday, November 4, 2010 1:42:54.657 UTC
pub const TWITTER_EPOCH: Duration = Duration::from_millis(1_288_834_974_657);

/// Discord epoch: Thursday, January 1, 2015 00:00:00 UTC
pub const DISCORD_EPOCH: Duration = Duration::from_millis(1_420_070_400_000);

/// A source of wall-clock time in milliseconds since the Unix epoch.
///
/// The generator reads the clock exclusively through this trait, so tests can
/// substitute a scripted clock to simulate regressions, sequence exhaustion or
/// many calls landing in the same millisecond.
///
/// Any `Fn() -> u64` is a `TimeSource`.
///
/// # Example
///
/// ```
/// use flakegen::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1_609_344_000_100
///     }
/// }
///
/// assert_eq!(FixedTime.current_millis(), 1_609_344_000_100);
///
/// let closure = || 42;
/// assert_eq!(closure.current_millis(), 42);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since `1970-01-01T00:00:00Z`.
    fn current_millis(&self) -> u64;
}

impl<F> TimeSource for F
where
    F: Fn() -> u64,
{
    fn current_millis(&self) -> u64 {
        self()
    }
}
