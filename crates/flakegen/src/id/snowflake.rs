use core::{fmt, time::Duration};

use crate::id::layout::{FieldLayout, write_bit_layout_debug};

/// A 64-bit Snowflake ID carrying datacenter and machine identity.
///
/// - 1 bit reserved (always zero, keeps the value positive as an `i64`)
/// - 41 bits timestamp (ms since the generator's epoch)
/// - 5 bits datacenter ID
/// - 5 bits machine ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21             17 16          12 11             0
///              +--------------+----------------+-----------------+--------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | datacenter (5)  | machine (5)  | sequence (12) |
///              +--------------+----------------+-----------------+--------------+---------------+
///              |<----------------- MSB ------------- 64 bits ------------- LSB ---------------->|
/// ```
///
/// IDs compare exactly like their raw `u64` values, so IDs issued later by the
/// same generator always compare greater.
///
/// # Example
///
/// ```
/// use flakegen::SnowflakeId;
///
/// let id = SnowflakeId::from_parts(100, 1, 2, 3);
/// assert_eq!(id.timestamp(), 100);
/// assert_eq!(id.datacenter_id(), 1);
/// assert_eq!(id.machine_id(), 2);
/// assert_eq!(id.sequence(), 3);
/// assert_eq!(id.to_raw(), (100 << 22) | (1 << 17) | (2 << 12) | 3);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(transparent)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Number of bits in the timestamp field.
    pub const TIMESTAMP_BITS: u64 = 41;

    /// Number of bits in the datacenter ID field.
    pub const DATACENTER_ID_BITS: u64 = 5;

    /// Number of bits in the machine ID field.
    pub const MACHINE_ID_BITS: u64 = 5;

    /// Number of bits in the sequence field.
    pub const SEQUENCE_BITS: u64 = 12;

    /// Bitmask for extracting the 41-bit timestamp field. Occupies bits 22
    /// through 62.
    pub const TIMESTAMP_MASK: u64 = (1 << Self::TIMESTAMP_BITS) - 1;

    /// Bitmask for extracting the 5-bit datacenter ID field. Occupies bits 17
    /// through 21.
    pub const DATACENTER_ID_MASK: u64 = (1 << Self::DATACENTER_ID_BITS) - 1;

    /// Bitmask for extracting the 5-bit machine ID field. Occupies bits 12
    /// through 16.
    pub const MACHINE_ID_MASK: u64 = (1 << Self::MACHINE_ID_BITS) - 1;

    /// Bitmask for extracting the 12-bit sequence field. Occupies bits 0
    /// through 11.
    pub const SEQUENCE_MASK: u64 = (1 << Self::SEQUENCE_BITS) - 1;

    /// Bitmask of the reserved top bit.
    pub const RESERVED_MASK: u64 = 1 << 63;

    /// Number of bits to shift the sequence field (bit 0).
    pub const SEQUENCE_SHIFT: u64 = 0;

    /// Number of bits to shift the machine ID to its correct position (bit 12).
    pub const MACHINE_ID_SHIFT: u64 = Self::SEQUENCE_BITS;

    /// Number of bits to shift the datacenter ID to its correct position
    /// (bit 17).
    pub const DATACENTER_ID_SHIFT: u64 = Self::MACHINE_ID_SHIFT + Self::MACHINE_ID_BITS;

    /// Number of bits to shift the timestamp to its correct position (bit 22).
    pub const TIMESTAMP_SHIFT: u64 = Self::DATACENTER_ID_SHIFT + Self::DATACENTER_ID_BITS;

    /// Largest encodable timestamp delta, roughly 69.7 years of milliseconds.
    pub const MAX_TIMESTAMP: u64 = Self::TIMESTAMP_MASK;

    /// Largest datacenter ID (31).
    pub const MAX_DATACENTER_ID: u64 = Self::DATACENTER_ID_MASK;

    /// Largest machine ID (31).
    pub const MAX_MACHINE_ID: u64 = Self::MACHINE_ID_MASK;

    /// Largest sequence value (4095).
    pub const MAX_SEQUENCE: u64 = Self::SEQUENCE_MASK;

    /// Packs the four fields into an ID. Each field is truncated to its width.
    pub const fn from_parts(
        timestamp: u64,
        datacenter_id: u64,
        machine_id: u64,
        sequence: u64,
    ) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let datacenter_id =
            (datacenter_id & Self::DATACENTER_ID_MASK) << Self::DATACENTER_ID_SHIFT;
        let machine_id = (machine_id & Self::MACHINE_ID_MASK) << Self::MACHINE_ID_SHIFT;
        let sequence = (sequence & Self::SEQUENCE_MASK) << Self::SEQUENCE_SHIFT;
        Self {
            id: timestamp | datacenter_id | machine_id | sequence,
        }
    }

    /// Wraps a raw integer without validation. See [`Self::is_valid`].
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the raw integer.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Extracts the timestamp delta (ms since the generator's epoch).
    pub const fn timestamp(&self) -> u64 {
        (self.id >> Self::TIMESTAMP_SHIFT) & Self::TIMESTAMP_MASK
    }

    /// Extracts the datacenter ID.
    pub const fn datacenter_id(&self) -> u64 {
        (self.id >> Self::DATACENTER_ID_SHIFT) & Self::DATACENTER_ID_MASK
    }

    /// Extracts the machine ID.
    pub const fn machine_id(&self) -> u64 {
        (self.id >> Self::MACHINE_ID_SHIFT) & Self::MACHINE_ID_MASK
    }

    /// Extracts the sequence number.
    pub const fn sequence(&self) -> u64 {
        (self.id >> Self::SEQUENCE_SHIFT) & Self::SEQUENCE_MASK
    }

    /// Returns `true` if the reserved top bit is clear.
    ///
    /// Every ID produced by a generator is valid. Raw integers from the
    /// outside world may not be.
    pub const fn is_valid(&self) -> bool {
        self.id & Self::RESERVED_MASK == 0
    }

    /// Converts the timestamp delta back to milliseconds since the Unix epoch,
    /// given the epoch the issuing generator was configured with.
    ///
    /// Saturates at `u64::MAX` for epochs no generator accepts.
    ///
    /// ```
    /// use flakegen::{DEFAULT_EPOCH, SnowflakeId};
    ///
    /// let id = SnowflakeId::from_parts(100, 0, 0, 0);
    /// assert_eq!(id.unix_millis(DEFAULT_EPOCH), 1_609_344_000_100);
    /// ```
    pub const fn unix_millis(&self, epoch: Duration) -> u64 {
        let epoch = epoch.as_millis();
        if epoch > u64::MAX as u128 {
            return u64::MAX;
        }
        (epoch as u64).saturating_add(self.timestamp())
    }

    /// Splits the ID into its decoded fields.
    pub const fn into_parts(self) -> SnowflakeParts {
        SnowflakeParts {
            timestamp: self.timestamp(),
            datacenter_id: self.datacenter_id(),
            machine_id: self.machine_id(),
            sequence: self.sequence(),
        }
    }

    /// Returns the ID as a zero-padded 20-digit string.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }

    /// Returns true if the current sequence value can be incremented.
    pub(crate) const fn has_sequence_room(&self) -> bool {
        self.sequence() < Self::MAX_SEQUENCE
    }

    /// Returns a new ID with the sequence incremented.
    pub(crate) const fn increment_sequence(&self) -> Self {
        Self::from_parts(
            self.timestamp(),
            self.datacenter_id(),
            self.machine_id(),
            self.sequence() + 1,
        )
    }

    /// Returns a new ID for a newer timestamp with sequence reset to zero.
    pub(crate) const fn rollover_to_timestamp(&self, ts: u64) -> Self {
        Self::from_parts(ts, self.datacenter_id(), self.machine_id(), 0)
    }

    fn fields(&self) -> [FieldLayout; 5] {
        [
            FieldLayout {
                name: "reserved",
                bits: 1,
                value: self.id >> 63,
            },
            FieldLayout {
                name: "timestamp",
                bits: Self::TIMESTAMP_BITS,
                value: self.timestamp(),
            },
            FieldLayout {
                name: "datacenter ID",
                bits: Self::DATACENTER_ID_BITS,
                value: self.datacenter_id(),
            },
            FieldLayout {
                name: "machine ID",
                bits: Self::MACHINE_ID_BITS,
                value: self.machine_id(),
            },
            FieldLayout {
                name: "sequence",
                bits: Self::SEQUENCE_BITS,
                value: self.sequence(),
            },
        ]
    }
}

/// The decoded fields of a [`SnowflakeId`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SnowflakeParts {
    /// Milliseconds since the issuing generator's epoch.
    pub timestamp: u64,
    /// Datacenter the ID was issued in.
    pub datacenter_id: u64,
    /// Machine within the datacenter that issued the ID.
    pub machine_id: u64,
    /// Position of the ID within its millisecond.
    pub sequence: u64,
}

impl From<SnowflakeParts> for SnowflakeId {
    fn from(parts: SnowflakeParts) -> Self {
        Self::from_parts(
            parts.timestamp,
            parts.datacenter_id,
            parts.machine_id,
            parts.sequence,
        )
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_bit_layout_debug(
            f,
            self.id,
            &self.to_padded_string(),
            &self.fields(),
            "SnowflakeId",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DEFAULT_EPOCH;

    #[test]
    fn layout_matches_documented_shifts() {
        assert_eq!(SnowflakeId::SEQUENCE_SHIFT, 0);
        assert_eq!(SnowflakeId::MACHINE_ID_SHIFT, 12);
        assert_eq!(SnowflakeId::DATACENTER_ID_SHIFT, 17);
        assert_eq!(SnowflakeId::TIMESTAMP_SHIFT, 22);
        assert_eq!(SnowflakeId::MAX_DATACENTER_ID, 31);
        assert_eq!(SnowflakeId::MAX_MACHINE_ID, 31);
        assert_eq!(SnowflakeId::MAX_SEQUENCE, 4095);
        assert_eq!(SnowflakeId::TIMESTAMP_SHIFT + SnowflakeId::TIMESTAMP_BITS, 63);
    }

    #[test]
    fn max_fields_fill_the_low_63_bits() {
        let id = SnowflakeId::from_parts(
            SnowflakeId::MAX_TIMESTAMP,
            SnowflakeId::MAX_DATACENTER_ID,
            SnowflakeId::MAX_MACHINE_ID,
            SnowflakeId::MAX_SEQUENCE,
        );
        assert_eq!(id.to_raw(), i64::MAX as u64);
        assert!(id.is_valid());
    }

    #[test]
    fn fields_do_not_bleed_into_neighbours() {
        let id = SnowflakeId::from_parts(0, u64::MAX, 0, 0);
        assert_eq!(id.datacenter_id(), 31);
        assert_eq!(id.machine_id(), 0);
        assert_eq!(id.timestamp(), 0);
        assert_eq!(id.sequence(), 0);
    }

    #[test]
    fn decodes_known_value() {
        // epoch + 100ms, datacenter 1, machine 2, sequence 2
        let raw = (100 << 22) | (1 << 17) | (2 << 12) | 2;
        let parts = SnowflakeId::from_raw(raw).into_parts();
        assert_eq!(
            parts,
            SnowflakeParts {
                timestamp: 100,
                datacenter_id: 1,
                machine_id: 2,
                sequence: 2,
            }
        );
        assert_eq!(SnowflakeId::from(parts).to_raw(), raw);
        assert_eq!(
            SnowflakeId::from_raw(raw).unix_millis(DEFAULT_EPOCH),
            1_609_344_000_100
        );
    }

    #[test]
    fn reserved_bit_marks_invalid() {
        assert!(!SnowflakeId::from_raw(1 << 63).is_valid());
        assert!(SnowflakeId::from_raw(0).is_valid());
    }

    #[test]
    fn ordering_follows_raw_value() {
        let a = SnowflakeId::from_parts(5, 31, 31, 4095);
        let b = SnowflakeId::from_parts(6, 0, 0, 0);
        assert!(a < b);
        assert!(u64::from(a) < u64::from(b));
    }

    #[test]
    fn sequence_helpers() {
        let id = SnowflakeId::from_parts(7, 3, 4, 4094);
        assert!(id.has_sequence_room());
        let next = id.increment_sequence();
        assert_eq!(next.sequence(), 4095);
        assert!(!next.has_sequence_room());

        let rolled = next.rollover_to_timestamp(8);
        assert_eq!(rolled.timestamp(), 8);
        assert_eq!(rolled.sequence(), 0);
        assert_eq!(rolled.datacenter_id(), 3);
        assert_eq!(rolled.machine_id(), 4);
    }

    #[test]
    fn unix_millis_saturates_on_huge_epoch() {
        let id = SnowflakeId::from_parts(10, 0, 0, 0);
        assert_eq!(id.unix_millis(Duration::from_millis(u64::MAX - 5)), u64::MAX);
        assert_eq!(id.unix_millis(Duration::from_secs(u64::MAX / 100)), u64::MAX);
        assert_eq!(id.unix_millis(Duration::from_millis(7)), 17);
    }

    #[test]
    fn display_and_padding() {
        let id = SnowflakeId::from_raw(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(id.to_padded_string(), "00000000000000000042");
    }

    #[test]
    fn debug_renders_layout_table() {
        let id = SnowflakeId::from_parts(100, 1, 2, 3);
        let rendered = format!("{id:?}");
        assert!(rendered.starts_with("SnowflakeId {"));
        assert!(rendered.contains("timestamp (41)"));
        assert!(rendered.contains("datacenter ID (5)"));
        assert!(rendered.contains("0x64"));
        assert!(rendered.ends_with('}'));
    }
}
