//! Daily recording schedule and its wire encoding.
//!
//! A schedule is a list of [`TimeInterval`]s, each giving the minute of the day
//! at which recording starts and stops. On the wire it is a one-byte count
//! followed by `(start, end)` pairs of little-endian `u16` values.

use crate::constants::{MAX_ENCODABLE_INTERVALS, MINUTES_PER_DAY, SCHEDULE_INTERVAL_SIZE};
use crate::error::EncodingError;
use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimeInterval {
    start_minute: u16,
    end_minute: u16,
}

impl TimeInterval {
    /// Start must be a minute of the day (0-1439); end may also be 1440 (midnight).
    pub fn new(start_minute: u16, end_minute: u16) -> Result<Self, EncodingError> {
        if start_minute >= MINUTES_PER_DAY {
            return Err(EncodingError::ValueOutOfRange {
                field: "start minute",
                value: start_minute.into(),
                max: (MINUTES_PER_DAY - 1).into(),
            });
        }
        if end_minute > MINUTES_PER_DAY {
            return Err(EncodingError::ValueOutOfRange {
                field: "end minute",
                value: end_minute.into(),
                max: MINUTES_PER_DAY.into(),
            });
        }
        Ok(Self {
            start_minute,
            end_minute,
        })
    }

    pub fn start_minute(&self) -> u16 {
        self.start_minute
    }

    pub fn end_minute(&self) -> u16 {
        self.end_minute
    }

    /// Length of the interval in minutes, zero if it is empty or inverted.
    pub fn duration_minutes(&self) -> u16 {
        self.end_minute.saturating_sub(self.start_minute)
    }
}

/// `H:MM` or `HH:MM`, digits only.
fn parse_clock(text: &str) -> Option<u16> {
    let (hours, minutes) = text.trim().split_once(':')?;
    let digits = |s: &str, widths: std::ops::RangeInclusive<usize>| {
        widths.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
    };
    if !digits(hours, 1..=2) || !digits(minutes, 2..=2) {
        return None;
    }
    let hours: u16 = hours.parse().ok()?;
    let minutes: u16 = minutes.parse().ok()?;
    if hours > 24 || minutes > 59 {
        return None;
    }
    Some(hours * 60 + minutes)
}

impl FromStr for TimeInterval {
    type Err = EncodingError;

    /// Parses `HH:MM-HH:MM`, e.g. `08:00-17:30` or `22:00-24:00`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EncodingError::InvalidInterval(s.to_string());
        let (start, end) = s.split_once('-').ok_or_else(invalid)?;
        let start = parse_clock(start).ok_or_else(invalid)?;
        let end = parse_clock(end).ok_or_else(invalid)?;
        TimeInterval::new(start, end)
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.start_minute / 60,
            self.start_minute % 60,
            self.end_minute / 60,
            self.end_minute % 60
        )
    }
}

/// Ordered, non-overlapping list of daily recording intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Schedule(Vec<TimeInterval>);

impl Schedule {
    pub fn new(intervals: Vec<TimeInterval>) -> Self {
        Self(intervals)
    }

    pub fn intervals(&self) -> &[TimeInterval] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that every interval is non-empty, intervals are sorted by start
    /// and none overlaps the next one. [`encode`] does not call this.
    pub fn validate(&self) -> Result<(), EncodingError> {
        for interval in &self.0 {
            if interval.end_minute <= interval.start_minute {
                return Err(EncodingError::EmptyInterval(*interval));
            }
        }
        for pair in self.0.windows(2) {
            if pair[1].start_minute < pair[0].end_minute {
                return Err(EncodingError::Overlap {
                    previous: pair[0],
                    next: pair[1],
                });
            }
        }
        Ok(())
    }

    /// Total minutes per day covered by the schedule.
    pub fn active_minutes(&self) -> u32 {
        self.0.iter().map(|i| u32::from(i.duration_minutes())).sum()
    }

    pub fn encode(&self) -> Result<Bytes, EncodingError> {
        encode(&self.0)
    }
}

impl From<Vec<TimeInterval>> for Schedule {
    fn from(intervals: Vec<TimeInterval>) -> Self {
        Self(intervals)
    }
}

/// Encode intervals as a count byte followed by `(start, end)` little-endian pairs.
///
/// The intervals are written in the order given. Callers are expected to pass a
/// sorted, non-overlapping list (see [`Schedule::validate`]).
pub fn encode(intervals: &[TimeInterval]) -> Result<Bytes, EncodingError> {
    if intervals.len() > MAX_ENCODABLE_INTERVALS {
        return Err(EncodingError::TooManyIntervals {
            count: intervals.len(),
        });
    }

    let mut buf = BytesMut::with_capacity(1 + intervals.len() * SCHEDULE_INTERVAL_SIZE);
    buf.put_u8(intervals.len() as u8);
    for interval in intervals {
        buf.put_u16_le(interval.start_minute);
        buf.put_u16_le(interval.end_minute);
    }
    Ok(buf.freeze())
}
