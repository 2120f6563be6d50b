//! Timestamp parsing and validation utilities.
//!
//! Annotation intervals use formats like `MM:SS`, `HH:MM:SS` and `SS`,
//! optionally with fractional seconds. The text is kept verbatim so it can be
//! handed to the transcoder unchanged.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Parse a timestamp string to total seconds.
///
/// Supports formats:
/// - `HH:MM:SS` or `HH:MM:SS.mmm`
/// - `MM:SS` or `MM:SS.mmm`
/// - `SS` or `SS.mmm`
///
/// # Examples
/// ```
/// use hdtf_models::timestamp::parse_timestamp;
/// assert_eq!(parse_timestamp("01:30:00").unwrap(), 5400.0);
/// assert_eq!(parse_timestamp("05:30").unwrap(), 330.0);
/// assert_eq!(parse_timestamp("90").unwrap(), 90.0);
/// ```
pub fn parse_timestamp(ts: &str) -> Result<f64, TimestampError> {
    let ts = ts.trim();
    if ts.is_empty() {
        return Err(TimestampError::Empty);
    }

    let parts: Vec<&str> = ts.split(':').collect();
    if parts.len() > 3 {
        return Err(TimestampError::InvalidFormat(ts.to_string()));
    }

    const UNITS: [&str; 3] = ["hours", "minutes", "seconds"];
    let offset = 3 - parts.len();

    let mut total = 0.0;
    for (i, part) in parts.iter().enumerate() {
        let unit = UNITS[offset + i];
        let value: f64 = part
            .parse()
            .map_err(|_| TimestampError::InvalidValue(unit, part.to_string()))?;
        if !value.is_finite() {
            return Err(TimestampError::InvalidValue(unit, part.to_string()));
        }
        if value < 0.0 {
            return Err(TimestampError::Negative);
        }
        total = total * 60.0 + value;
    }

    Ok(total)
}

/// A validated timestamp, kept in its original textual form.
#[derive(Debug, Clone, PartialEq)]
pub struct Timestamp {
    raw: String,
    secs: f64,
}

impl Timestamp {
    /// The timestamp exactly as it appeared in the annotation file.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The timestamp in seconds.
    pub fn as_secs(&self) -> f64 {
        self.secs
    }
}

impl FromStr for Timestamp {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let secs = parse_timestamp(s)?;
        Ok(Self {
            raw: s.trim().to_string(),
            secs,
        })
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Timestamp parsing errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimestampError {
    #[error("Timestamp cannot be empty")]
    Empty,

    #[error("Invalid timestamp format: {0}")]
    InvalidFormat(String),

    #[error("Invalid {0} value: {1}")]
    InvalidValue(&'static str, String),

    #[error("Timestamp cannot be negative")]
    Negative,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!(parse_timestamp("00:05").unwrap(), 5.0);
        assert_eq!(parse_timestamp("01:02:03").unwrap(), 3723.0);
        assert_eq!(parse_timestamp("7").unwrap(), 7.0);
        assert!((parse_timestamp("00:01.5").unwrap() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_timestamp(""), Err(TimestampError::Empty));
        assert!(matches!(
            parse_timestamp("1:2:3:4"),
            Err(TimestampError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_timestamp("ab:10"),
            Err(TimestampError::InvalidValue("minutes", _))
        ));
    }

    #[test]
    fn test_timestamp_keeps_raw_text() {
        let ts: Timestamp = "00:10".parse().unwrap();
        assert_eq!(ts.as_str(), "00:10");
        assert_eq!(ts.to_string(), "00:10");
        assert_eq!(ts.as_secs(), 10.0);
    }
}
