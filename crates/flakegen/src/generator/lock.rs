use core::{cmp::Ordering, time::Duration};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{DEFAULT_EPOCH, Error, IdGenStatus, Result, SnowflakeId, SystemClock, TimeSource};

/// The last issued ID, or `None` before the first successful call.
type State = Option<SnowflakeId>;

/// A lock-based Snowflake ID generator safe to share across threads.
///
/// The last issued ID (and with it the last timestamp and sequence) lives
/// behind a single mutex. Every call reads the clock, compares, updates and
/// encodes while holding that lock, so concurrent callers can never observe a
/// torn `(timestamp, sequence)` pair. Generators are fully independent of one
/// another; run one per `(datacenter_id, machine_id)` identity.
///
/// Cloning yields another handle to the **same** state. Hand clones to
/// threads freely; they keep drawing from one sequence space.
///
/// ## Guarantees
/// - IDs from one generator are strictly increasing in issuance order.
/// - Generators with distinct identities never collide.
/// - A clock that steps backward fails the call with
///   [`Error::ClockMovedBackwards`] and leaves the state untouched.
/// - Sequence exhaustion (more than 4096 IDs in a millisecond) is absorbed by
///   busy-waiting for the next millisecond; it is never an error.
///
/// # Example
/// ```
/// use flakegen::{IdGenerator, SystemClock};
///
/// let generator = IdGenerator::new(1, 2, SystemClock).unwrap();
///
/// let a = generator.try_next_id().unwrap();
/// let b = generator.try_next_id().unwrap();
/// assert!(a < b);
/// assert_eq!(b.datacenter_id(), 1);
/// assert_eq!(b.machine_id(), 2);
/// ```
#[derive(Debug)]
pub struct IdGenerator<T = SystemClock>
where
    T: TimeSource,
{
    #[cfg(feature = "cache-padded")]
    state: Arc<crossbeam_utils::CachePadded<Mutex<State>>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Arc<Mutex<State>>,
    /// Milliseconds since the Unix epoch.
    epoch: u64,
    datacenter_id: u64,
    machine_id: u64,
    time: T,
}

impl<T> IdGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator measuring time from [`DEFAULT_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `datacenter_id` or
    /// `machine_id` exceeds 31.
    pub fn new(datacenter_id: u64, machine_id: u64, time: T) -> Result<Self> {
        Self::with_epoch(DEFAULT_EPOCH, datacenter_id, machine_id, time)
    }

    /// Creates a generator measuring time from a custom epoch.
    ///
    /// # Parameters
    ///
    /// - `epoch`: Origin of the timestamp field, as a [`Duration`] since
    ///   1970-01-01 UTC. All generators sharing an ID namespace must agree on
    ///   it.
    /// - `datacenter_id`: Identity of the datacenter, `0..=31`.
    /// - `machine_id`: Identity of the node within the datacenter, `0..=31`.
    /// - `time`: A [`TimeSource`] such as [`SystemClock`] or
    ///   [`MonotonicClock`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `datacenter_id` or
    /// `machine_id` exceeds 31, or if `epoch` is so large that adding a
    /// timestamp to it would overflow `u64` milliseconds. Nothing is
    /// validated lazily; a generator that was built successfully never
    /// reports a configuration error.
    ///
    /// # Example
    /// ```
    /// use flakegen::{Error, IdGenerator, TWITTER_EPOCH};
    ///
    /// let result = IdGenerator::with_epoch(TWITTER_EPOCH, 32, 0, || 0u64);
    /// assert!(matches!(
    ///     result,
    ///     Err(Error::InvalidConfiguration { field: "datacenter_id", .. })
    /// ));
    /// ```
    ///
    /// [`MonotonicClock`]: crate::MonotonicClock
    pub fn with_epoch(
        epoch: Duration,
        datacenter_id: u64,
        machine_id: u64,
        time: T,
    ) -> Result<Self> {
        let epoch = check_epoch(epoch)?;
        check_field("datacenter_id", datacenter_id, SnowflakeId::MAX_DATACENTER_ID)?;
        check_field("machine_id", machine_id, SnowflakeId::MAX_MACHINE_ID)?;
        Ok(Self::from_state(epoch, datacenter_id, machine_id, None, time))
    }

    /// Creates a generator that resumes after `last_id`.
    ///
    /// The identity fields are taken from `last_id`. The next ID will be
    /// strictly greater than `last_id`, and a clock reading earlier than its
    /// timestamp is reported as a regression.
    ///
    /// This constructor is primarily useful for restoring state persisted by
    /// a previous process, or for controlling the starting point in tests.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if `epoch` lies so far in the
    /// future that epoch plus the largest timestamp no longer fits a `u64`
    /// of milliseconds.
    pub fn from_components(epoch: Duration, last_id: SnowflakeId, time: T) -> Result<Self> {
        let epoch = check_epoch(epoch)?;
        Ok(Self::from_state(
            epoch,
            last_id.datacenter_id(),
            last_id.machine_id(),
            Some(last_id),
            time,
        ))
    }

    fn from_state(epoch: u64, datacenter_id: u64, machine_id: u64, state: State, time: T) -> Self {
        Self {
            #[cfg(feature = "cache-padded")]
            state: Arc::new(crossbeam_utils::CachePadded::new(Mutex::new(state))),
            #[cfg(not(feature = "cache-padded"))]
            state: Arc::new(Mutex::new(state)),
            epoch,
            datacenter_id,
            machine_id,
            time,
        }
    }

    /// The epoch timestamps are measured from.
    pub const fn epoch(&self) -> Duration {
        Duration::from_millis(self.epoch)
    }

    /// The datacenter ID encoded into every ID.
    pub const fn datacenter_id(&self) -> u64 {
        self.datacenter_id
    }

    /// The machine ID encoded into every ID.
    pub const fn machine_id(&self) -> u64 {
        self.machine_id
    }

    /// Generates the next ID, busy-waiting if the current millisecond's
    /// sequence is exhausted.
    ///
    /// # Errors
    ///
    /// - [`Error::ClockMovedBackwards`] if the clock reads earlier than the
    ///   last issued ID. Not retried internally.
    /// - [`Error::TimestampOutOfRange`] if the clock reads earlier than the
    ///   epoch or beyond the 41-bit timestamp horizon.
    ///
    /// On error no state changes, so a later call succeeds once the clock has
    /// recovered.
    ///
    /// # Example
    /// ```
    /// use flakegen::{IdGenerator, SystemClock};
    ///
    /// let generator = IdGenerator::new(0, 7, SystemClock).unwrap();
    /// match generator.try_next_id() {
    ///     Ok(id) => println!("{id}"),
    ///     Err(e) if e.is_clock_error() => eprintln!("clock trouble: {e}"),
    ///     Err(e) => panic!("{e}"),
    /// }
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_next_id(&self) -> Result<SnowflakeId> {
        let mut state = self.lock();
        match self.poll_locked(&mut state)? {
            IdGenStatus::Ready { id } => Ok(id),
            IdGenStatus::Pending { yield_until } => {
                // Spin with the lock held, otherwise another caller could
                // claim the new millisecond's first sequence.
                let timestamp = self.spin_until(yield_until)?;
                let id = SnowflakeId::from_parts(timestamp, self.datacenter_id, self.machine_id, 0);
                *state = Some(id);
                Ok(id)
            }
        }
    }

    /// Attempts to generate the next ID without waiting.
    ///
    /// Identical to [`Self::try_next_id`] except that sequence exhaustion is
    /// returned as [`IdGenStatus::Pending`] with the clock reading to wait
    /// for, leaving the back-off strategy to the caller.
    ///
    /// # Errors
    ///
    /// Same as [`Self::try_next_id`].
    ///
    /// # Example
    /// ```
    /// use flakegen::{IdGenStatus, IdGenerator, MonotonicClock};
    ///
    /// let generator = IdGenerator::new(0, 0, MonotonicClock::new()).unwrap();
    ///
    /// let id = loop {
    ///     match generator.try_poll_id().unwrap() {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert!(id.is_valid());
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> Result<IdGenStatus> {
        let mut state = self.lock();
        self.poll_locked(&mut state)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock()
    }

    /// Reads the clock and advances `state` if an ID can be issued. Must be
    /// called with the lock held.
    fn poll_locked(&self, state: &mut State) -> Result<IdGenStatus> {
        let now = self.time.current_millis();

        let Some(last) = *state else {
            let id = SnowflakeId::from_parts(
                self.timestamp_at(now)?,
                self.datacenter_id,
                self.machine_id,
                0,
            );
            *state = Some(id);
            return Ok(IdGenStatus::Ready { id });
        };

        let last_millis = self.epoch + last.timestamp();
        match now.cmp(&last_millis) {
            Ordering::Equal => {
                if last.has_sequence_room() {
                    let id = last.increment_sequence();
                    *state = Some(id);
                    Ok(IdGenStatus::Ready { id })
                } else {
                    Ok(IdGenStatus::Pending {
                        yield_until: last_millis + 1,
                    })
                }
            }
            Ordering::Greater => {
                let id = last.rollover_to_timestamp(self.timestamp_at(now)?);
                *state = Some(id);
                Ok(IdGenStatus::Ready { id })
            }
            Ordering::Less => Err(Self::cold_clock_behind(now, last_millis)),
        }
    }

    /// Polls the clock in a tight loop until it reaches `target`, then
    /// returns the reading as a timestamp delta.
    fn spin_until(&self, target: u64) -> Result<u64> {
        loop {
            let now = self.time.current_millis();
            if now >= target {
                return self.timestamp_at(now);
            }
            core::hint::spin_loop();
        }
    }

    /// Converts a clock reading into the 41-bit timestamp field.
    fn timestamp_at(&self, now: u64) -> Result<u64> {
        match now.checked_sub(self.epoch) {
            Some(timestamp) if timestamp <= SnowflakeId::MAX_TIMESTAMP => Ok(timestamp),
            _ => Err(Self::cold_out_of_range(now, self.epoch)),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(now: u64, last: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::warn!(now, last, behind_ms = last - now, "clock moved backwards");
        Error::ClockMovedBackwards { now, last }
    }

    #[cold]
    #[inline(never)]
    fn cold_out_of_range(now: u64, epoch: u64) -> Error {
        #[cfg(feature = "tracing")]
        tracing::error!(now, epoch, "clock reading cannot be encoded relative to epoch");
        Error::TimestampOutOfRange { now, epoch }
    }
}

impl<T> Clone for IdGenerator<T>
where
    T: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            epoch: self.epoch,
            datacenter_id: self.datacenter_id,
            machine_id: self.machine_id,
            time: self.time.clone(),
        }
    }
}

fn check_field(field: &'static str, value: u64, max: u64) -> Result<()> {
    if value > max {
        #[cfg(feature = "tracing")]
        tracing::error!(field, value, max, "configuration field out of range");
        return Err(Error::InvalidConfiguration { field, value, max });
    }
    Ok(())
}

/// Largest epoch, in milliseconds, for which `epoch + timestamp + 1` cannot
/// overflow for any encodable timestamp.
const MAX_EPOCH_MILLIS: u64 = u64::MAX - SnowflakeId::MAX_TIMESTAMP - 1;

fn check_epoch(epoch: Duration) -> Result<u64> {
    let millis = u64::try_from(epoch.as_millis()).unwrap_or(u64::MAX);
    check_field("epoch", millis, MAX_EPOCH_MILLIS)?;
    Ok(millis)
}
