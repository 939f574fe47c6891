mod appointment;
mod shared;

pub use appointment::{
    create_appointment, get_appointment_instances, get_calendar_instances,
};
pub use shared::usecase::{execute, UseCase};
