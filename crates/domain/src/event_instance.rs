use crate::shared::entity::ID;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One concrete occurrence of an appointment after exceptions are applied
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurrenceInstance {
    pub id: ID,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}
