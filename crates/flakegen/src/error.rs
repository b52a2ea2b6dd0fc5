/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `flakegen` can produce.
///
/// Configuration errors surface only from constructors. The clock errors
/// surface only from ID generation and never modify generator state, so a
/// later call succeeds as soon as the clock is sane again.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A value passed to a constructor is out of range: an identity field
    /// that does not fit its bit field, or an epoch so large that
    /// timestamps relative to it would overflow.
    #[error("invalid configuration: {field} = {value} exceeds maximum of {max}")]
    InvalidConfiguration {
        /// Name of the offending field (`"datacenter_id"`, `"machine_id"` or
        /// `"epoch"`).
        field: &'static str,
        /// The rejected value.
        value: u64,
        /// The largest value the field accepts.
        max: u64,
    },

    /// The clock reported a time earlier than the last issued ID.
    ///
    /// Typically caused by an NTP step, manual adjustment or VM migration.
    /// Callers decide the policy: back off and retry, alert, or fail over.
    #[error(
        "clock moved backwards: now = {now} ms, last issued at {last} ms; refusing to generate id"
    )]
    ClockMovedBackwards {
        /// The current clock reading, in milliseconds since the Unix epoch.
        now: u64,
        /// The timestamp of the last issued ID, in milliseconds since the
        /// Unix epoch.
        last: u64,
    },

    /// The clock reading cannot be encoded relative to the configured epoch.
    ///
    /// Either the clock reads earlier than the epoch, or more than
    /// [`SnowflakeId::MAX_TIMESTAMP`] milliseconds have elapsed since it.
    ///
    /// [`SnowflakeId::MAX_TIMESTAMP`]: crate::SnowflakeId::MAX_TIMESTAMP
    #[error("timestamp out of range: now = {now} ms, epoch = {epoch} ms")]
    TimestampOutOfRange {
        /// The current clock reading, in milliseconds since the Unix epoch.
        now: u64,
        /// The configured epoch, in milliseconds since the Unix epoch.
        epoch: u64,
    },
}

impl Error {
    /// Returns `true` if this error was caused by the clock rather than by
    /// configuration.
    pub const fn is_clock_error(&self) -> bool {
        matches!(
            self,
            Self::ClockMovedBackwards { .. } | Self::TimestampOutOfRange { .. }
        )
    }
}
