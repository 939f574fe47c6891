mod appointment;
mod event_instance;
mod expansion;
pub mod recurrence;
mod shared;
mod timespan;

pub use appointment::{Appointment, AppointmentError, AppointmentFields};
pub use event_instance::RecurrenceInstance;
pub use expansion::{expand_series, ExpansionError, ExpansionSettings};
pub use recurrence::{EndCondition, Recurrence, RecurrenceParseError};
pub use shared::entity::{Entity, ID};
pub use timespan::{InvalidTimeSpanError, TimeSpan};
