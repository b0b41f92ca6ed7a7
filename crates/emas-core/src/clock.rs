//! WIB wall-clock helpers.
//!
//! All display times in the document are Western Indonesia Time (UTC+7),
//! regardless of where the process runs.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Utc};

use crate::error::CoreError;

/// WIB offset from UTC, in seconds.
pub const WIB_OFFSET_SECS: i32 = 7 * 3600;

/// Current time in WIB.
pub fn wib_now() -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(WIB_OFFSET_SECS).expect("valid fixed offset");
    Utc::now().with_timezone(&offset)
}

/// A time of day reported by a user, `HH:MM`.
///
/// Parsing accepts `.` and `,` as separators since that is how the times
/// arrive from chat clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    /// Build from components, validating the 24h range.
    pub fn new(hour: u8, minute: u8) -> Result<Self, CoreError> {
        if hour > 23 || minute > 59 {
            return Err(CoreError::InvalidClockTime(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    /// Minutes since midnight.
    pub fn minutes_of_day(&self) -> u32 {
        u32::from(self.hour) * 60 + u32::from(self.minute)
    }
}

impl FromStr for ClockTime {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['.', ','], ":");
        let (h, m) = normalized
            .split_once(':')
            .ok_or_else(|| CoreError::InvalidClockTime(s.to_string()))?;
        let hour: u8 = h
            .parse()
            .map_err(|_| CoreError::InvalidClockTime(s.to_string()))?;
        let minute: u8 = m
            .parse()
            .map_err(|_| CoreError::InvalidClockTime(s.to_string()))?;
        Self::new(hour, minute).map_err(|_| CoreError::InvalidClockTime(s.to_string()))
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}
