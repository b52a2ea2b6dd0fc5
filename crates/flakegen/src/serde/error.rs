use crate::SnowflakeId;

/// Errors that can occur while deserializing a [`SnowflakeId`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum SerdeError {
    /// The decoded integer sets the reserved top bit, so no generator could
    /// have issued it.
    #[error("decoded id {id} sets the reserved bit")]
    DecodeOverflow {
        /// The decoded ID value, which failed validation.
        id: SnowflakeId,
    },

    /// The input string is not a decimal `u64`.
    #[error("invalid decimal id: {input:?}")]
    InvalidDigits {
        /// The rejected input.
        input: String,
    },
}
