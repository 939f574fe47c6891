pub mod create_appointment;
pub mod get_appointment_instances;
pub mod get_calendar_instances;
