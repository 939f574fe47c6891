mod inmemory;

pub use inmemory::InMemoryAppointmentRepo;
use spcal_domain::{Appointment, ID};

/// Source boundary for calendar items. Series masters and their exception
/// rows live in the same collection.
pub trait IAppointmentRepo: Send + Sync {
    fn insert(&self, appointment: &Appointment) -> anyhow::Result<()>;
    fn find(&self, appointment_id: &ID) -> Option<Appointment>;
    /// Deleted and modified occurrence rows pointing at `series_id`
    fn find_exceptions(&self, series_id: &ID) -> Vec<Appointment>;
    fn find_all(&self) -> Vec<Appointment>;
}
