//! Human-readable order numbers.
//!
//! Order numbers are the externally shown identifier for an order, distinct
//! from its internal UUID. The format is `ORD-<year>-<12 hex chars>`: a
//! recognizable prefix, the order year, and a random high-entropy suffix.
//! Randomness keeps order numbers unguessable without the volume leak of a
//! sequential counter.

use chrono::{Datelike, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// A human-readable, globally unique order number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Prefix shared by all order numbers.
    pub const PREFIX: &'static str = "ORD";

    /// Number of random suffix bytes (rendered as 2 hex chars each).
    ///
    /// 6 bytes gives a 2^48 suffix space, comfortably collision-free at any
    /// plausible order volume; the database UNIQUE constraint backstops it.
    const SUFFIX_BYTES: usize = 6;

    /// Generate a new order number for the current year.
    #[must_use]
    pub fn generate() -> Self {
        let mut suffix = [0u8; Self::SUFFIX_BYTES];
        rand::rng().fill(&mut suffix[..]);
        let hex: String = suffix.iter().map(|b| format!("{b:02X}")).collect();
        Self(format!("{}-{}-{hex}", Self::PREFIX, Utc::now().year()))
    }

    /// Returns the order number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OrderNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for OrderNumber {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// SQLx support (with postgres feature)
#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for OrderNumber {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <String as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for OrderNumber {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s = <String as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(s))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for OrderNumber {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <String as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_format() {
        let number = OrderNumber::generate();
        let parts: Vec<&str> = number.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1], Utc::now().year().to_string());
        assert_eq!(parts[2].len(), 12);
        assert!(
            parts[2]
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase())
        );
    }

    #[test]
    fn test_ten_thousand_generations_are_unique() {
        let numbers: HashSet<OrderNumber> =
            (0..10_000).map(|_| OrderNumber::generate()).collect();
        assert_eq!(numbers.len(), 10_000);
    }

    #[test]
    fn test_concurrent_generation_is_unique() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    (0..1_250)
                        .map(|_| OrderNumber::generate())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for number in handle.join().unwrap() {
                assert!(seen.insert(number), "duplicate order number generated");
            }
        }
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn test_serde_transparent() {
        let number = OrderNumber::from("ORD-2026-0011AABBCCDD".to_string());
        let json = serde_json::to_string(&number).unwrap();
        assert_eq!(json, "\"ORD-2026-0011AABBCCDD\"");
    }
}
