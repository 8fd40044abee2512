//! Canonical invoice ids.
//!
//! A canonical id looks like `INV-260208-A1B2`: a fixed prefix, the issue
//! date as `YYMMDD` in UTC+8, and a four-character suffix alternating
//! uppercase letter and digit.
//!
//! Before submission to the gateway an id is *decorated* with extra
//! segments (`INV-260208-A1B2-1733820000000`) so every attempt is unique on
//! the gateway side. [`normalize`] recovers the canonical id from whatever
//! the gateway echoes back.

use compact_str::CompactString;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use time::{OffsetDateTime, UtcOffset};

/// Civil offset used for the date segment (Asia/Makassar, no DST).
pub const INVOICE_OFFSET: UtcOffset = match UtcOffset::from_hms(8, 0, 0) {
    Ok(offset) => offset,
    Err(_) => UtcOffset::UTC,
};

const LETTERS: &[u8; 26] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8; 10] = b"0123456789";

#[allow(clippy::expect_used)]
mod pattern {
    lazy_static::lazy_static! {
        pub(super) static ref CANONICAL: regex::Regex =
            regex::Regex::new(r"INV-[0-9]{6}-[A-Z][0-9][A-Z][0-9]").expect("invoice id pattern");
    }
}

/// Source of uniform random indices for id generation.
///
/// Injected so tests can assert exact ids.
pub trait RandomSource {
    /// Return an index in `0..len`.
    fn pick(&mut self, len: usize) -> usize;
}

/// [`RandomSource`] backed by the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&mut self, len: usize) -> usize {
        rand::rng().random_range(0..len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a canonical invoice id: {0:?}")]
pub struct InvoiceIdError(pub String);

/// A validated canonical invoice id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceId(CompactString);

impl InvoiceId {
    /// Generate an id dated today in [`INVOICE_OFFSET`].
    ///
    /// Ids are not checked for collisions; the store rejects duplicates.
    pub fn generate(rng: &mut impl RandomSource) -> Self {
        Self::generate_at(OffsetDateTime::now_utc(), rng)
    }

    /// Generate an id dated `now` in [`INVOICE_OFFSET`].
    pub fn generate_at(now: OffsetDateTime, rng: &mut impl RandomSource) -> Self {
        let local = now.to_offset(INVOICE_OFFSET);
        let mut suffix = [0u8; 4];
        for (i, slot) in suffix.iter_mut().enumerate() {
            let source: &[u8] = if i % 2 == 0 { LETTERS } else { DIGITS };
            *slot = source[rng.pick(source.len()) % source.len()];
        }
        let id = compact_str::format_compact!(
            "INV-{:02}{:02}{:02}-{}{}{}{}",
            local.year().rem_euclid(100),
            u8::from(local.month()),
            local.day(),
            char::from(suffix[0]),
            char::from(suffix[1]),
            char::from(suffix[2]),
            char::from(suffix[3]),
        );
        Self(id)
    }

    /// Parse an exact canonical id. Decorated ids are rejected; run them
    /// through [`normalize`] first.
    pub fn parse(raw: &str) -> Result<Self, InvoiceIdError> {
        match pattern::CANONICAL.find(raw) {
            Some(m) if m.start() == 0 && m.end() == raw.len() => Ok(Self(CompactString::from(raw))),
            _ => Err(InvoiceIdError(raw.to_owned())),
        }
    }

    /// Recover the canonical id embedded in a possibly decorated string.
    pub fn from_decorated(raw: &str) -> Result<Self, InvoiceIdError> {
        Self::parse(normalize(raw))
    }

    /// Append `-{suffix}`, producing a gateway invoice number.
    pub fn decorate(&self, suffix: impl fmt::Display) -> String {
        format!("{}-{}", self.0, suffix)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for InvoiceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for InvoiceId {
    type Error = InvoiceIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InvoiceId> for String {
    fn from(value: InvoiceId) -> Self {
        value.0.into_string()
    }
}

impl std::str::FromStr for InvoiceId {
    type Err = InvoiceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Return the first canonical id found in `raw`, or `raw` unchanged when
/// there is none.
///
/// Only the pattern decides; splitting on `-` is not used because it
/// accepts any three segments.
pub fn normalize(raw: &str) -> &str {
    pattern::CANONICAL
        .find(raw)
        .map(|m| m.as_str())
        .unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Month, PrimitiveDateTime, Time};

    /// Replays a fixed list of indices.
    struct Sequence(std::vec::IntoIter<usize>);

    impl Sequence {
        fn new(values: &[usize]) -> Self {
            Self(values.to_vec().into_iter())
        }
    }

    impl RandomSource for Sequence {
        fn pick(&mut self, _len: usize) -> usize {
            self.0.next().unwrap_or(0)
        }
    }

    fn utc(y: i32, m: Month, d: u8, h: u8, min: u8) -> OffsetDateTime {
        PrimitiveDateTime::new(
            Date::from_calendar_date(y, m, d).unwrap(),
            Time::from_hms(h, min, 0).unwrap(),
        )
        .assume_utc()
    }

    #[test]
    fn test_generate_is_deterministic_with_injected_source() {
        let mut rng = Sequence::new(&[0, 1, 1, 2]);
        let id = InvoiceId::generate_at(utc(2026, Month::February, 8, 3, 0), &mut rng);
        assert_eq!(id.as_str(), "INV-260208-A1B2");
    }

    #[test]
    fn test_generate_uses_utc_plus_eight() {
        // 17:00 UTC is already the next day in Makassar.
        let mut rng = Sequence::new(&[25, 9, 25, 9]);
        let id = InvoiceId::generate_at(utc(2026, Month::December, 31, 17, 0), &mut rng);
        assert_eq!(id.as_str(), "INV-270101-Z9Z9");

        let mut rng = Sequence::new(&[25, 9, 25, 9]);
        let id = InvoiceId::generate_at(utc(2026, Month::December, 31, 15, 59), &mut rng);
        assert_eq!(id.as_str(), "INV-261231-Z9Z9");
    }

    #[test]
    fn test_generated_ids_are_canonical() {
        let mut rng = ThreadRandom;
        for _ in 0..200 {
            let id = InvoiceId::generate(&mut rng);
            assert_eq!(id.as_str().len(), 15);
            assert_eq!(normalize(id.as_str()), id.as_str());
            assert_eq!(InvoiceId::parse(id.as_str()), Ok(id.clone()));
        }
    }

    #[test]
    fn test_normalize_strips_decoration() {
        let id = InvoiceId::parse("INV-260208-A1B2").unwrap();
        let decorated = id.decorate(1_733_820_000_000u64);
        assert_eq!(decorated, "INV-260208-A1B2-1733820000000");
        assert_eq!(normalize(&decorated), "INV-260208-A1B2");
        assert_eq!(InvoiceId::from_decorated(&decorated), Ok(id));
    }

    #[test]
    fn test_normalize_returns_input_without_match() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("ORDER-1-2-3"), "ORDER-1-2-3");
        assert_eq!(normalize("INV-2602-A1B2"), "INV-2602-A1B2");
        assert_eq!(normalize("inv-260208-a1b2"), "inv-260208-a1b2");
    }

    #[test]
    fn test_parse_rejects_non_canonical() {
        assert!(InvoiceId::parse("INV-260208-A1B2-1").is_err());
        assert!(InvoiceId::parse(" INV-260208-A1B2").is_err());
        assert!(InvoiceId::parse("INV-260208-1A2B").is_err());
        assert!(InvoiceId::parse("INV-26O208-A1B2").is_err());
        assert!(InvoiceId::parse("").is_err());
    }

    #[test]
    fn test_serde_validates() {
        let id: InvoiceId = serde_json::from_str(r#""INV-260208-A1B2""#).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), r#""INV-260208-A1B2""#);
        assert!(serde_json::from_str::<InvoiceId>(r#""INV-260208""#).is_err());
    }
}
