use crate::{
    recurrence::{Recurrence, RecurrenceParseError},
    shared::entity::{Entity, ID},
};
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raw field set of a calendar list item, keyed by the SharePoint field names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentFields {
    #[serde(rename = "ID")]
    pub id: i64,
    #[serde(rename = "EventDate")]
    pub event_date: NaiveDateTime,
    #[serde(rename = "EndDate")]
    pub end_date: NaiveDateTime,
    /// Seconds, textual
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "fAllDayEvent", default)]
    pub all_day: String,
    #[serde(rename = "fRecurrence", default)]
    pub has_recurrence: bool,
    #[serde(rename = "EventType", default)]
    pub event_type: i32,
    #[serde(rename = "MasterSeriesItemID", default)]
    pub master_series_item_id: Option<i64>,
    /// Original start of the occurrence an exception row replaces
    #[serde(rename = "RecurrenceID", default)]
    pub recurrence_id: Option<NaiveDateTime>,
    #[serde(rename = "RecurrenceData", default)]
    pub recurrence_data: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    pub id: ID,
    pub start: NaiveDateTime,
    /// End of the first occurrence
    pub end: NaiveDateTime,
    /// In seconds
    pub duration: i64,
    pub all_day: bool,
    pub recurrence: Recurrence,
}

impl Entity for Appointment {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum AppointmentError {
    #[error("Appointment {id} has a malformed duration: `{value}`")]
    MalformedDuration { id: ID, value: String },
    #[error("Appointment {id} has a negative duration: {value}")]
    NegativeDuration { id: ID, value: i64 },
    #[error("Appointment {id} has a duration that does not fit the calendar: {value}")]
    DurationOutOfRange { id: ID, value: i64 },
    #[error("Appointment {id} has a malformed all day flag: `{value}`")]
    MalformedAllDayFlag { id: ID, value: String },
    #[error("Appointment {id} has an invalid recurrence descriptor `{descriptor}`: {source}")]
    Recurrence {
        id: ID,
        descriptor: String,
        source: RecurrenceParseError,
    },
}

impl Appointment {
    pub fn from_fields(fields: &AppointmentFields) -> Result<Self, AppointmentError> {
        let id = ID::new(fields.id);

        let duration = fields.duration.trim().parse::<i64>().map_err(|_| {
            AppointmentError::MalformedDuration {
                id,
                value: fields.duration.clone(),
            }
        })?;
        if duration < 0 {
            return Err(AppointmentError::NegativeDuration {
                id,
                value: duration,
            });
        }

        let all_day = parse_flag(&fields.all_day).ok_or_else(|| {
            AppointmentError::MalformedAllDayFlag {
                id,
                value: fields.all_day.clone(),
            }
        })?;

        let recurrence =
            Recurrence::from_fields(fields).map_err(|source| AppointmentError::Recurrence {
                id,
                descriptor: fields.recurrence_data.clone().unwrap_or_default(),
                source,
            })?;

        let out_of_range = || AppointmentError::DurationOutOfRange {
            id,
            value: duration,
        };
        let first_end = Duration::try_seconds(duration)
            .and_then(|d| fields.event_date.checked_add_signed(d))
            .ok_or_else(out_of_range)?;

        // The EndDate of a series master is the end of its last occurrence
        let end = match recurrence {
            Recurrence::NoRecurrence
            | Recurrence::DeletedInstance { .. }
            | Recurrence::ModifiedInstance { .. } => fields.end_date,
            _ => first_end,
        };

        Ok(Self {
            id,
            start: fields.event_date,
            end,
            duration,
            all_day,
            recurrence,
        })
    }

    /// `None` when the stored seconds exceed what a `Duration` can hold
    pub fn duration(&self) -> Option<Duration> {
        Duration::try_seconds(self.duration)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" => Some(false),
        "1" | "true" => Some(true),
        _ => None,
    }
}
