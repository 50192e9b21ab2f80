//! Time-window filters
//!
//! `<field>=<from>~<to>,<format>` keeps records whose `field` falls inside
//! the closed interval `[from, to]`, compared at whole seconds.
//!
//! ```text
//! localtime=2018-01-01T00:00:00+0900~2018-03-30T23:59:59+0900,iso8601
//! time=01/Jan/2018:00:00:00 +0900~30/Mar/2018:23:59:59 +0900,common
//! ```

use crate::record::Record;
use chrono::DateTime;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TimeRangeError {
    #[error("Time range is invalid: '{spec}'. Missing '{separator}'")]
    MissingSeparator { spec: String, separator: char },

    #[error("Unknown time format '{0}'. Valid formats are: iso8601, common")]
    UnknownFormat(String),

    #[error("Cannot parse '{value}' as {format} time: {reason}")]
    InvalidTime {
        value: String,
        format: TimeFormat,
        reason: String,
    },
}

/// Supported timestamp layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// `2006-01-02T15:04:05-0700`
    Iso8601,
    /// Apache/Nginx common log format, `02/Jan/2006:15:04:05 -0700`
    Common,
}

impl TimeFormat {
    pub fn layout(&self) -> &'static str {
        match self {
            TimeFormat::Iso8601 => "%Y-%m-%dT%H:%M:%S%z",
            TimeFormat::Common => "%d/%b/%Y:%H:%M:%S %z",
        }
    }

    /// Parse `value` into seconds since the Unix epoch
    pub fn parse_seconds(&self, value: &str) -> Result<i64, TimeRangeError> {
        DateTime::parse_from_str(value.trim(), self.layout())
            .map(|time| time.timestamp())
            .map_err(|e| TimeRangeError::InvalidTime {
                value: value.to_string(),
                format: *self,
                reason: e.to_string(),
            })
    }
}

impl FromStr for TimeFormat {
    type Err = TimeRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "iso8601" => Ok(TimeFormat::Iso8601),
            "common" => Ok(TimeFormat::Common),
            _ => Err(TimeRangeError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeFormat::Iso8601 => f.write_str("iso8601"),
            TimeFormat::Common => f.write_str("common"),
        }
    }
}

/// A compiled time window over one field
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRange {
    pub field: String,
    pub format: TimeFormat,
    /// Inclusive bounds, seconds since the Unix epoch
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub fn parse(spec: &str) -> Result<Self, TimeRangeError> {
        let missing = |separator| TimeRangeError::MissingSeparator {
            spec: spec.to_string(),
            separator,
        };

        let (field, range) = spec.split_once('=').ok_or_else(|| missing('='))?;
        let (from, rest) = range.split_once('~').ok_or_else(|| missing('~'))?;
        let (to, format) = rest.split_once(',').ok_or_else(|| missing(','))?;

        let format: TimeFormat = format.parse()?;
        let start = format.parse_seconds(from)?;
        let end = format.parse_seconds(to)?;

        Ok(TimeRange {
            field: field.trim().to_string(),
            format,
            start,
            end,
        })
    }

    /// Whether the field's value is a timestamp inside the window
    pub fn contains(&self, record: &Record) -> bool {
        let value = record.value_or_empty(&self.field);
        match self.format.parse_seconds(value) {
            Ok(seconds) => self.start <= seconds && seconds <= self.end,
            Err(e) => {
                tracing::debug!(field = %self.field, "record excluded from time range: {e}");
                false
            }
        }
    }
}

/// All time windows of a run, combined with AND
#[derive(Debug, Clone, Default)]
pub struct TimeRangeSet {
    ranges: Vec<TimeRange>,
}

impl TimeRangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile every spec; invalid ones are logged and skipped
    pub fn compile<S: AsRef<str>>(specs: &[S]) -> Self {
        let ranges = specs
            .iter()
            .filter_map(|spec| {
                let spec = spec.as_ref();
                TimeRange::parse(spec)
                    .inspect_err(|e| {
                        tracing::warn!(timegrep = spec, "skipping invalid time range: {e}")
                    })
                    .ok()
            })
            .collect();
        TimeRangeSet { ranges }
    }

    pub fn contains(&self, record: &Record) -> bool {
        self.ranges.iter().all(|range| range.contains(record))
    }

    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}
