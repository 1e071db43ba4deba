//! Clock-time helpers for slot windows.
//!
//! All schedule arithmetic runs on whole minutes since midnight; these
//! functions convert between that and the "HH:MM[:SS]" strings used in
//! configuration and presentation. The end of a window may be "24:00"
//! (minute 1440) to mean end of day.

use crate::error::{Error, Result};

/// Minutes in a full day.
pub const DAY_MINUTES: u32 = 24 * 60;

/// Parse "HH:MM" or "HH:MM:SS" into minutes since midnight.
/// Seconds are accepted but ignored (slots have minute resolution).
pub fn time_to_minutes(s: &str) -> Result<u32> {
    let err = |reason: &str| Error::Time {
        value: s.to_string(),
        reason: reason.to_string(),
    };

    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return Err(err("expected HH:MM or HH:MM:SS"));
    }
    let hours: u32 = parts[0]
        .parse()
        .map_err(|_| err("hours are not a number"))?;
    let minutes: u32 = parts[1]
        .parse()
        .map_err(|_| err("minutes are not a number"))?;
    if minutes >= 60 {
        return Err(err("minutes out of range"));
    }
    if hours > 24 {
        return Err(err("beyond 24:00"));
    }
    let total = hours * 60 + minutes;
    if total > DAY_MINUTES {
        return Err(err("beyond 24:00"));
    }
    Ok(total)
}

/// Parse "HH:MM[:SS]-HH:MM[:SS]" into (start, end) minute offsets.
/// The start must come strictly before the end.
pub fn parse_time_range(s: &str) -> Result<(u32, u32)> {
    let parts: Vec<&str> = s.trim().split('-').collect();
    if parts.len() != 2 {
        return Err(Error::Time {
            value: s.to_string(),
            reason: "expected START-END".to_string(),
        });
    }
    let start = time_to_minutes(parts[0])?;
    let end = time_to_minutes(parts[1])?;
    if start >= end {
        return Err(Error::Time {
            value: s.to_string(),
            reason: "start must be before end".to_string(),
        });
    }
    Ok((start, end))
}

/// Format a minute offset as "HH:MM:SS" (seconds always zero).
/// Minute 1440 renders as "24:00:00"; callers that need wall-clock
/// semantics handle the day rollover themselves.
pub fn minutes_to_hms(minutes: u32) -> String {
    format!("{:02}:{:02}:00", minutes / 60, minutes % 60)
}
