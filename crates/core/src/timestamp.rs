//! Conversion between SRT timestamps (`HH:MM:SS,mmm`) and milliseconds.
//! The hours field is unbounded, everything else is zero padded.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A point in a media timeline at millisecond resolution.
/// Displays and serializes as the SRT string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub fn as_millis(self) -> u64 {
        self.0
    }

    pub fn as_seconds(self) -> f64 {
        to_seconds(self.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format(self.0))
    }
}

impl FromStr for Timestamp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        parse(s).map(Self)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(self.0))
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Parse `HH:MM:SS,mmm` into milliseconds.
/// Minutes and seconds must be below 60 and the fraction exactly three digits.
pub fn parse(t: &str) -> Result<u64> {
    let malformed = || Error::MalformedTimestamp(t.to_string());
    let mut groups = t.split(':');
    let (Some(h), Some(m), Some(s_ms), None) =
        (groups.next(), groups.next(), groups.next(), groups.next())
    else {
        return Err(malformed());
    };
    let (s, ms) = s_ms.split_once(',').ok_or_else(malformed)?;
    if ms.len() != 3 {
        return Err(malformed());
    }
    let h = digits(h).ok_or_else(malformed)?;
    let m = digits(m).filter(|m| *m < 60).ok_or_else(malformed)?;
    let s = digits(s).filter(|s| *s < 60).ok_or_else(malformed)?;
    let ms = digits(ms).ok_or_else(malformed)?;
    h.checked_mul(3_600_000)
        .and_then(|total| total.checked_add((m * 60 + s) * 1000 + ms))
        .ok_or_else(malformed)
}

/// Format milliseconds back to `HH:MM:SS,mmm`.
pub fn format(ms: u64) -> String {
    let h = ms / 3_600_000;
    let m = (ms % 3_600_000) / 60_000;
    let s = (ms % 60_000) / 1000;
    let ms = ms % 1000;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

/// Milliseconds as fractional seconds.
pub fn to_seconds(ms: u64) -> f64 {
    ms as f64 / 1000.0
}

// `u64::from_str` accepts a leading `+`, so check the digits ourselves.
fn digits(group: &str) -> Option<u64> {
    if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    group.parse().ok()
}
