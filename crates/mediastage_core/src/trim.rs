use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

// ---------------------------------------------------------------------------
// TrimRange
// ---------------------------------------------------------------------------

/// In/out points in whole seconds. Always `start <= end`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TrimRange {
    start: u32,
    end: u32,
}

impl TrimRange {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start > end {
            return Err(CoreError::InvalidTrimRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The range covering a whole clip of `duration_secs`.
    pub fn whole(duration_secs: u32) -> Self {
        Self {
            start: 0,
            end: duration_secs,
        }
    }

    /// Build a range from two slider positions, rounding each down.
    pub fn from_positions(start: f64, end: f64) -> Result<Self> {
        Self::new(floor_secs(start), floor_secs(end))
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn fits_within(&self, duration_secs: u32) -> bool {
        self.end <= duration_secs
    }

    pub fn to_detail(&self) -> TrimDetail {
        TrimDetail {
            start: self.start,
            end: self.end,
        }
    }
}

impl fmt::Display for TrimRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// Round a playback position down to whole seconds. Negative and NaN
/// positions collapse to zero.
pub fn floor_secs(position: f64) -> u32 {
    if position.is_nan() || position <= 0.0 {
        0
    } else {
        position.floor().min(u32::MAX as f64) as u32
    }
}

// ---------------------------------------------------------------------------
// TrimDetail
// ---------------------------------------------------------------------------

/// A trim as stored next to a staged item and handed to processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrimDetail {
    pub start: u32,
    pub end: u32,
}

impl TrimDetail {
    pub fn start_as_ffmpeg(&self) -> String {
        ffmpeg_timestamp(self.start)
    }

    pub fn end_as_ffmpeg(&self) -> String {
        ffmpeg_timestamp(self.end)
    }

    /// Suffix appended to a file stem for the trimmed copy.
    pub fn tweak_name(&self) -> String {
        format!("-trim-{}:{}", self.start, self.end)
    }

    pub fn to_range(&self) -> Result<TrimRange> {
        TrimRange::new(self.start, self.end)
    }
}

/// `HH:MM:SS` for a whole number of seconds.
pub fn ffmpeg_timestamp(secs: u32) -> String {
    let hours = secs / 3600;
    let mins = (secs / 60) % 60;
    let secs = secs % 60;
    format!("{:02}:{:02}:{:02}", hours, mins, secs)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_rejects_inverted_bounds() {
        assert!(TrimRange::new(10, 5).is_err());
        let r = TrimRange::new(5, 5).unwrap();
        assert!(r.is_empty());
        assert_eq!(r.len(), 0);
    }

    #[test]
    fn whole_range_spans_clip() {
        let r = TrimRange::whole(120);
        assert_eq!((r.start(), r.end()), (0, 120));
        assert!(r.fits_within(120));
        assert!(!r.fits_within(119));
        assert_eq!(r.to_string(), "[0, 120]");
    }

    #[test]
    fn positions_round_down() {
        let r = TrimRange::from_positions(1.9, 89.99).unwrap();
        assert_eq!((r.start(), r.end()), (1, 89));
    }

    #[test]
    fn floor_secs_handles_odd_input() {
        assert_eq!(floor_secs(-3.0), 0);
        assert_eq!(floor_secs(f64::NAN), 0);
        assert_eq!(floor_secs(42.7), 42);
    }

    #[test]
    fn ffmpeg_timestamps() {
        assert_eq!(ffmpeg_timestamp(0), "00:00:00");
        assert_eq!(ffmpeg_timestamp(59), "00:00:59");
        assert_eq!(ffmpeg_timestamp(3661), "01:01:01");

        let detail = TrimDetail { start: 90, end: 4000 };
        assert_eq!(detail.start_as_ffmpeg(), "00:01:30");
        assert_eq!(detail.end_as_ffmpeg(), "01:06:40");
    }

    #[test]
    fn tweak_name_embeds_bounds() {
        let detail = TrimRange::new(3, 6).unwrap().to_detail();
        assert_eq!(detail.tweak_name(), "-trim-3:6");
        assert_eq!(detail.to_range().unwrap(), TrimRange::new(3, 6).unwrap());
    }
}
