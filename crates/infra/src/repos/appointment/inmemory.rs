use super::IAppointmentRepo;
use crate::repos::shared::inmemory_repo::*;
use spcal_domain::{Appointment, ID};

pub struct InMemoryAppointmentRepo {
    appointments: std::sync::Mutex<Vec<Appointment>>,
}

impl InMemoryAppointmentRepo {
    pub fn new() -> Self {
        Self {
            appointments: std::sync::Mutex::new(Vec::new()),
        }
    }
}

impl IAppointmentRepo for InMemoryAppointmentRepo {
    fn insert(&self, appointment: &Appointment) -> anyhow::Result<()> {
        if !insert_unique(appointment, &self.appointments) {
            anyhow::bail!("Appointment with id {} already exists", appointment.id);
        }
        Ok(())
    }

    fn find(&self, appointment_id: &ID) -> Option<Appointment> {
        find(appointment_id, &self.appointments)
    }

    fn find_exceptions(&self, series_id: &ID) -> Vec<Appointment> {
        find_by(&self.appointments, |appointment| {
            appointment.recurrence.series_id().as_ref() == Some(series_id)
        })
    }

    fn find_all(&self) -> Vec<Appointment> {
        find_by(&self.appointments, |_| true)
    }
}
