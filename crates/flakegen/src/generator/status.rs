use crate::SnowflakeId;

/// Represents the result of a non-blocking attempt to generate an ID.
///
/// This type models the outcome of [`IdGenerator::try_poll_id`]:
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means the sequence for the current millisecond
///   is exhausted and no ID can be issued until the clock reaches
///   `yield_until`.
///
/// The blocking [`IdGenerator::try_next_id`] never surfaces `Pending`; it
/// spins on the clock instead.
///
/// # Example
///
/// ```
/// use flakegen::{IdGenStatus, IdGenerator};
///
/// let generator = IdGenerator::new(1, 2, || 1_609_344_000_100u64).unwrap();
/// match generator.try_poll_id().unwrap() {
///     IdGenStatus::Ready { id } => assert_eq!(id.timestamp(), 100),
///     IdGenStatus::Pending { yield_until } => println!("Back off until: {yield_until}"),
/// }
/// ```
///
/// [`IdGenerator::try_poll_id`]: crate::IdGenerator::try_poll_id
/// [`IdGenerator::try_next_id`]: crate::IdGenerator::try_next_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated Snowflake ID.
        id: SnowflakeId,
    },
    /// No ID could be generated because the sequence has been exhausted for
    /// the current millisecond.
    Pending {
        /// The earliest clock reading (ms since the Unix epoch) at which a
        /// new ID can be issued.
        yield_until: u64,
    },
}
