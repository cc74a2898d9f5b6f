//! Human-readable daily sequential tag ids.
//!
//! # Responsibility
//! - Format and parse `{PREFIX}-{YYYY-MM-DD}-{####}` identifiers.
//! - Compute the successor of the latest tag id issued on a given day.
//!
//! # Invariants
//! - Suffixes are exactly 4 digits in `1..=9999`.
//! - A day that would need suffix 10000 fails instead of widening the format.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static TAG_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(CRB|PND)-(\d{4}-\d{2}-\d{2})-(\d{4})$").expect("valid tag id regex")
});

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Highest suffix that fits the 4-digit format.
pub const MAX_SEQUENCE: u32 = 9999;

/// Record type encoded in the tag id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagPrefix {
    Crab,
    Pond,
}

impl TagPrefix {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crab => "CRB",
            Self::Pond => "PND",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "CRB" => Some(Self::Crab),
            "PND" => Some(Self::Pond),
            _ => None,
        }
    }
}

/// Errors produced while deriving tag ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagIdError {
    /// The day already issued suffix 9999.
    SequenceExhausted { prefix: TagPrefix, day: NaiveDate },
    /// Stored value does not follow the tag id format.
    Malformed(String),
}

impl Display for TagIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SequenceExhausted { prefix, day } => write!(
                f,
                "tag id sequence exhausted for {}-{}",
                prefix.as_str(),
                day.format(DAY_FORMAT)
            ),
            Self::Malformed(value) => write!(f, "malformed tag id `{value}`"),
        }
    }
}

impl Error for TagIdError {}

/// Parsed components of a tag id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagId {
    pub prefix: TagPrefix,
    pub day: NaiveDate,
    pub sequence: u32,
}

impl TagId {
    /// Parses `CRB-2025-04-08-0001` style values.
    pub fn parse(value: &str) -> Result<Self, TagIdError> {
        let malformed = || TagIdError::Malformed(value.to_string());
        let caps = TAG_ID_RE.captures(value).ok_or_else(malformed)?;
        let prefix = TagPrefix::parse(&caps[1]).ok_or_else(malformed)?;
        let day = NaiveDate::parse_from_str(&caps[2], DAY_FORMAT).map_err(|_| malformed())?;
        let sequence = caps[3].parse::<u32>().map_err(|_| malformed())?;
        Ok(Self {
            prefix,
            day,
            sequence,
        })
    }
}

impl Display for TagId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{:04}",
            self.prefix.as_str(),
            self.day.format(DAY_FORMAT),
            self.sequence
        )
    }
}

/// Returns the SQL `LIKE` pattern matching every tag id of one day.
pub fn day_pattern(prefix: TagPrefix, day: NaiveDate) -> String {
    format!("{}-{}-%", prefix.as_str(), day.format(DAY_FORMAT))
}

/// Returns the `YYYY-MM-DD` key used by the per-day counter.
pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Extracts the sequence of `value` when it belongs to `prefix` and `day`.
///
/// Values of another prefix/day, or malformed values, yield `None`.
pub fn sequence_for_day(value: &str, prefix: TagPrefix, day: NaiveDate) -> Option<u32> {
    TagId::parse(value)
        .ok()
        .filter(|tag| tag.prefix == prefix && tag.day == day)
        .map(|tag| tag.sequence)
}

/// Builds the tag id that follows sequence `last` on `day`.
///
/// `last == 0` means nothing was issued yet and yields suffix `0001`.
pub fn tag_after(prefix: TagPrefix, day: NaiveDate, last: u32) -> Result<TagId, TagIdError> {
    if last >= MAX_SEQUENCE {
        return Err(TagIdError::SequenceExhausted { prefix, day });
    }
    Ok(TagId {
        prefix,
        day,
        sequence: last + 1,
    })
}

/// Computes the next tag id from the greatest tag id already issued on `day`.
pub fn next_tag_id(
    prefix: TagPrefix,
    day: NaiveDate,
    latest: Option<&str>,
) -> Result<TagId, TagIdError> {
    let last = latest
        .and_then(|value| sequence_for_day(value, prefix, day))
        .unwrap_or(0);
    tag_after(prefix, day, last)
}

#[cfg(test)]
mod tests {
    use super::{day_pattern, next_tag_id, TagId, TagIdError, TagPrefix};
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 8).unwrap()
    }

    #[test]
    fn first_tag_of_the_day_uses_0001() {
        let tag = next_tag_id(TagPrefix::Crab, day(), None).unwrap();
        assert_eq!(tag.to_string(), "CRB-2025-04-08-0001");
    }

    #[test]
    fn next_tag_increments_latest_suffix() {
        let tag = next_tag_id(TagPrefix::Crab, day(), Some("CRB-2025-04-08-0007")).unwrap();
        assert_eq!(tag.to_string(), "CRB-2025-04-08-0008");
    }

    #[test]
    fn latest_from_another_day_restarts_sequence() {
        let tag = next_tag_id(TagPrefix::Pond, day(), Some("PND-2025-04-07-0042")).unwrap();
        assert_eq!(tag.to_string(), "PND-2025-04-08-0001");
    }

    #[test]
    fn sequence_past_9999_is_rejected() {
        let err = next_tag_id(TagPrefix::Pond, day(), Some("PND-2025-04-08-9999")).unwrap_err();
        assert!(matches!(err, TagIdError::SequenceExhausted { .. }));
    }

    #[test]
    fn parse_rejects_malformed_values() {
        assert!(TagId::parse("CRB-2025-04-08-1").is_err());
        assert!(TagId::parse("XYZ-2025-04-08-0001").is_err());
        assert!(TagId::parse("CRB-2025-13-40-0001").is_err());
    }

    #[test]
    fn day_pattern_matches_like_syntax() {
        assert_eq!(day_pattern(TagPrefix::Crab, day()), "CRB-2025-04-08-%");
    }
}
