mod appointment;
mod shared;

pub use appointment::IAppointmentRepo;
use appointment::InMemoryAppointmentRepo;
use std::sync::Arc;

#[derive(Clone)]
pub struct Repos {
    pub appointments: Arc<dyn IAppointmentRepo>,
}

impl Repos {
    pub fn create_inmemory() -> Self {
        Self {
            appointments: Arc::new(InMemoryAppointmentRepo::new()),
        }
    }
}
