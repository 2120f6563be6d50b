//! Clip interval, crop rectangle and clip spec models.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::timestamp::{Timestamp, TimestampError};

/// Separator between the start and end of an annotated interval.
pub const INTERVAL_SEPARATOR: char = '-';

/// Errors raised while building clip models from annotation fields.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("Interval must be `start-end`, got `{0}`")]
    InvalidInterval(String),

    #[error("Invalid timestamp in interval `{interval}`: {source}")]
    InvalidTimestamp {
        interval: String,
        #[source]
        source: TimestampError,
    },

    #[error("Crop must have 4 fields (x w y h), got {0}")]
    CropFieldCount(usize),

    #[error("Crop field `{0}` is not a non-negative integer")]
    CropField(String),

    #[error("Crop width and height must be positive, got {width}x{height}")]
    EmptyCrop { width: u32, height: u32 },
}

/// A time interval to trim from a raw video.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl Interval {
    /// Duration in seconds (may be zero or negative if the annotation is inverted).
    pub fn duration_secs(&self) -> f64 {
        self.end.as_secs() - self.start.as_secs()
    }
}

impl FromStr for Interval {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(INTERVAL_SEPARATOR);
        let (start, end) = match (parts.next(), parts.next(), parts.next()) {
            (Some(start), Some(end), None) if !start.is_empty() && !end.is_empty() => (start, end),
            _ => return Err(ModelError::InvalidInterval(s.to_string())),
        };

        let parse = |ts: &str| {
            ts.parse::<Timestamp>()
                .map_err(|source| ModelError::InvalidTimestamp {
                    interval: s.to_string(),
                    source,
                })
        };

        Ok(Self {
            start: parse(start)?,
            end: parse(end)?,
        })
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.start, INTERVAL_SEPARATOR, self.end)
    }
}

/// A rectangular crop in source pixel coordinates.
///
/// Field order matches the annotation files: `x width y height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRect {
    pub x: u32,
    pub width: u32,
    pub y: u32,
    pub height: u32,
}

impl CropRect {
    /// Create a crop rectangle, rejecting empty areas.
    pub fn new(x: u32, width: u32, y: u32, height: u32) -> Result<Self, ModelError> {
        if width == 0 || height == 0 {
            return Err(ModelError::EmptyCrop { width, height });
        }
        Ok(Self { x, width, y, height })
    }

    /// Build from the four textual annotation fields.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, ModelError> {
        if fields.len() != 4 {
            return Err(ModelError::CropFieldCount(fields.len()));
        }

        let mut values = [0u32; 4];
        for (value, field) in values.iter_mut().zip(fields) {
            let field: &str = field.as_ref();
            *value = field
                .parse()
                .map_err(|_| ModelError::CropField(field.to_string()))?;
        }

        let [x, width, y, height] = values;
        Self::new(x, width, y, height)
    }

    /// FFmpeg crop filter expression (`crop=w:h:x:y`).
    pub fn filter(&self) -> String {
        format!("crop={}:{}:{}:{}", self.width, self.height, self.x, self.y)
    }
}

/// One interval to extract from a raw video, with its crop.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipSpec {
    /// Clip index in the interval annotation (`{video}_{source_index}.mp4`).
    pub source_index: usize,
    pub interval: Interval,
    pub crop: CropRect,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_parse() {
        let interval: Interval = "00:00-00:05".parse().unwrap();
        assert_eq!(interval.start.as_str(), "00:00");
        assert_eq!(interval.end.as_str(), "00:05");
        assert_eq!(interval.duration_secs(), 5.0);
        assert_eq!(interval.to_string(), "00:00-00:05");
    }

    #[test]
    fn test_interval_requires_single_separator() {
        assert!(matches!(
            "00:00".parse::<Interval>(),
            Err(ModelError::InvalidInterval(_))
        ));
        assert!(matches!(
            "00:00-00:05-00:09".parse::<Interval>(),
            Err(ModelError::InvalidInterval(_))
        ));
        assert!(matches!(
            "-00:05".parse::<Interval>(),
            Err(ModelError::InvalidInterval(_))
        ));
        assert!(matches!(
            "00:xx-00:05".parse::<Interval>(),
            Err(ModelError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn test_crop_from_fields() {
        let crop = CropRect::from_fields(&["10", "200", "20", "300"]).unwrap();
        assert_eq!(crop, CropRect { x: 10, width: 200, y: 20, height: 300 });
        assert_eq!(crop.filter(), "crop=200:300:10:20");
    }

    #[test]
    fn test_crop_rejects_bad_fields() {
        assert_eq!(
            CropRect::from_fields(&["1", "2", "3"]),
            Err(ModelError::CropFieldCount(3))
        );
        assert!(matches!(
            CropRect::from_fields(&["1", "-2", "3", "4"]),
            Err(ModelError::CropField(_))
        ));
        assert_eq!(
            CropRect::from_fields(&["0", "0", "0", "10"]),
            Err(ModelError::EmptyCrop { width: 0, height: 10 })
        );
    }
}
