use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::error::Error;

/// Inclusive query window over instance start and end timestamps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSpan {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl TimeSpan {
    pub fn create(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, InvalidTimeSpanError> {
        if end < start {
            Err(InvalidTimeSpanError(start, end))
        } else {
            Ok(Self { start, end })
        }
    }

    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        start <= self.end && end >= self.start
    }
}

#[derive(Debug, PartialEq)]
pub struct InvalidTimeSpanError(NaiveDateTime, NaiveDateTime);

impl Error for InvalidTimeSpanError {}

impl std::fmt::Display for InvalidTimeSpanError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Provided timespan start: {} and end: {} is invalid. The end can not be before the start.",
            self.0, self.1
        )
    }
}
