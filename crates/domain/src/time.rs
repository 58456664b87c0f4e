//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for `last_run`, `next_run`, log times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Add a fractional number of hours to `from`, rounded to the millisecond.
///
/// Saturates at the largest representable timestamp instead of panicking.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn add_hours(from: Timestamp, hours: f64) -> Timestamp {
    let millis = (hours * 3_600_000.0).round() as i64;
    from.checked_add_signed(chrono::Duration::milliseconds(millis))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Serde codec writing timestamps as ISO-8601 UTC with millisecond precision
/// (`2024-05-01T08:30:00.000Z`), the format used by the persisted documents.
pub mod iso_millis {
    use chrono::{DateTime, SecondsFormat};
    use serde::{Deserialize, Deserializer, Serializer};

    use super::Timestamp;

    /// Serialize a timestamp.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    /// Deserialize any RFC 3339 timestamp into UTC.
    ///
    /// # Errors
    ///
    /// Fails when the string is not valid RFC 3339.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Timestamp, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.to_utc())
            .map_err(serde::de::Error::custom)
    }

    /// Same codec for nullable timestamps (`null` when absent).
    pub mod option {
        use chrono::{DateTime, SecondsFormat};
        use serde::{Deserialize, Deserializer, Serializer};

        use crate::time::Timestamp;

        /// Serialize an optional timestamp.
        ///
        /// # Errors
        ///
        /// Propagates serializer errors.
        #[allow(clippy::ref_option)]
        pub fn serialize<S: Serializer>(
            ts: &Option<Timestamp>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match ts {
                Some(ts) => {
                    serializer.serialize_some(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
                }
                None => serializer.serialize_none(),
            }
        }

        /// Deserialize an optional RFC 3339 timestamp.
        ///
        /// # Errors
        ///
        /// Fails when a present string is not valid RFC 3339.
        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Timestamp>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|raw| {
                    DateTime::parse_from_rfc3339(&raw)
                        .map(|dt| dt.to_utc())
                        .map_err(serde::de::Error::custom)
                })
                .transpose()
        }
    }
}
