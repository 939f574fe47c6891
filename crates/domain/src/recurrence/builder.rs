use super::{match_end_condition, match_pattern, EndCondition, Recurrence, RecurrenceParseError};
use crate::{appointment::AppointmentFields, shared::entity::ID};
use chrono::{NaiveDateTime, Timelike};
use tracing::warn;

/// Meaning of the `EventType` code of a calendar item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Regular,
    DeletedOccurrence,
    ModifiedOccurrence,
}

impl EventKind {
    pub fn from_code(code: i32) -> Self {
        match code {
            3 => Self::DeletedOccurrence,
            4 => Self::ModifiedOccurrence,
            _ => Self::Regular,
        }
    }
}

/// Two producer tools quote attributes differently, so everything is matched
/// against the double quoted form.
pub fn normalize_descriptor(descriptor: &str) -> String {
    descriptor.replace('\'', "\"")
}

impl Recurrence {
    pub fn from_fields(fields: &AppointmentFields) -> Result<Self, RecurrenceParseError> {
        if !fields.has_recurrence {
            return Ok(Self::NoRecurrence);
        }

        match EventKind::from_code(fields.event_type) {
            EventKind::DeletedOccurrence => {
                let (series_id, occurrence) = exception_key(fields)?;
                Ok(Self::DeletedInstance {
                    series_id,
                    occurrence,
                })
            }
            EventKind::ModifiedOccurrence => {
                let (series_id, occurrence) = exception_key(fields)?;
                Ok(Self::ModifiedInstance {
                    series_id,
                    occurrence,
                })
            }
            EventKind::Regular => Self::from_descriptor(
                fields.recurrence_data.as_deref().unwrap_or_default(),
                fields.end_date,
            ),
        }
    }

    /// Parses a series descriptor. `end_date` is the item's own end, which
    /// replaces a window end that falls on midnight: such a boundary sits one
    /// day after the end of the last occurrence.
    pub fn from_descriptor(
        descriptor: &str,
        end_date: NaiveDateTime,
    ) -> Result<Self, RecurrenceParseError> {
        let descriptor = normalize_descriptor(descriptor);

        let pattern = match match_pattern(&descriptor)? {
            Some(pattern) => pattern,
            None => {
                warn!("Unrecognized recurrence descriptor: {}", descriptor);
                return Ok(Self::UnknownRecurrence);
            }
        };

        let end = match match_end_condition(&descriptor)? {
            Some(EndCondition::ExplicitEndDate(window_end)) if is_midnight(&window_end) => {
                EndCondition::ExplicitEndDate(end_date)
            }
            Some(end) => end,
            None => EndCondition::ImplicitEnd,
        };

        Ok(Self::from_pattern(pattern, end))
    }
}

fn exception_key(fields: &AppointmentFields) -> Result<(ID, NaiveDateTime), RecurrenceParseError> {
    let series_id = fields
        .master_series_item_id
        .ok_or(RecurrenceParseError::MissingField("MasterSeriesItemID"))?;
    let occurrence = fields
        .recurrence_id
        .ok_or(RecurrenceParseError::MissingField("RecurrenceID"))?;
    Ok((ID::new(series_id), occurrence))
}

fn is_midnight(dt: &NaiveDateTime) -> bool {
    dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0
}
