use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{SerdeError, SnowflakeId};

fn validate<E: serde::de::Error>(raw: u64) -> Result<SnowflakeId, E> {
    let id = SnowflakeId::from_raw(raw);
    if !id.is_valid() {
        return Err(E::custom(SerdeError::DecodeOverflow { id }));
    }
    Ok(id)
}

/// Serializes as the native integer.
impl Serialize for SnowflakeId {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        as_native::serialize(self, s)
    }
}

/// Deserializes from the native integer, rejecting values with the reserved
/// bit set.
impl<'de> Deserialize<'de> for SnowflakeId {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        as_native::deserialize(d)
    }
}

/// `#[serde(with = "as_native")]`: a snowflake ID as its `u64`.
pub mod as_native {
    use super::{Deserialize, Deserializer, Serialize, Serializer, validate};
    use crate::SnowflakeId;

    /// Serialize a snowflake ID as its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S: Serializer>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error> {
        id.to_raw().serialize(s)
    }

    /// Deserialize a snowflake ID from its native integer representation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The value sets the reserved top bit
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SnowflakeId, D::Error> {
        validate(u64::deserialize(d)?)
    }
}

/// `#[serde(with = "as_string")]`: a snowflake ID as a decimal string.
///
/// Useful for consumers such as JavaScript that lose precision on integers
/// above 2^53.
pub mod as_string {
    use super::{Deserializer, Serializer, validate};
    use crate::{SerdeError, SnowflakeId};

    /// Serialize a snowflake ID as a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying serializer fails.
    pub fn serialize<S: Serializer>(id: &SnowflakeId, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(id)
    }

    /// Deserialize a snowflake ID from a decimal string.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The underlying deserializer fails
    /// - The string is not a decimal `u64`
    /// - The value sets the reserved top bit
    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<SnowflakeId, D::Error> {
        struct DecimalVisitor;

        impl serde::de::Visitor<'_> for DecimalVisitor {
            type Value = SnowflakeId;

            fn expecting(&self, formatter: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                formatter.write_str("a decimal snowflake id string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let raw = v.parse::<u64>().map_err(|_| {
                    E::custom(SerdeError::InvalidDigits {
                        input: v.to_owned(),
                    })
                })?;
                validate(raw)
            }
        }

        d.deserialize_str(DecimalVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn native_roundtrip() {
        #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
        struct Row {
            event_id: SnowflakeId,
        }
        let row = Row {
            event_id: SnowflakeId::from_raw(42),
        };

        let json = serde_json::to_string(&row).expect("serialize");
        assert_eq!(json, r#"{"event_id":42}"#);
        let back: Row = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, row);
    }

    #[test]
    fn native_rejects_reserved_bit() {
        #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
        struct Row {
            #[serde(with = "as_native")]
            event_id: SnowflakeId,
        }
        let json = json!({ "event_id": u64::MAX });
        let err = serde_json::from_value::<Row>(json).expect_err("should fail");
        assert_eq!(
            err.to_string(),
            SerdeError::DecodeOverflow {
                id: SnowflakeId::from_raw(u64::MAX)
            }
            .to_string()
        );
    }

    #[test]
    fn string_roundtrip() {
        #[derive(PartialEq, Eq, Debug, Serialize, Deserialize)]
        struct Row {
            #[serde(with = "as_string")]
            event_id: SnowflakeId,
        }
        let row = Row {
            event_id: SnowflakeId::from_parts(100, 1, 2, 3),
        };

        let json = serde_json::to_string(&row).expect("serialize");
        assert_eq!(json, r#"{"event_id":"419569667"}"#);
        let back: Row = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, row);
    }

    #[test]
    fn string_rejects_garbage() {
        #[derive(Debug, Deserialize)]
        struct Row {
            #[serde(with = "as_string")]
            #[allow(dead_code)]
            event_id: SnowflakeId,
        }
        let err = serde_json::from_str::<Row>(r#"{"event_id":"12ab"}"#).expect_err("should fail");
        assert!(err.to_string().contains("invalid decimal id"));
    }
}
