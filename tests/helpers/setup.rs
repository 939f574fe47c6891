use spcal::{create_appointment::CreateAppointmentUseCase, execute};
use spcal_domain::{Appointment, AppointmentFields};
use spcal_infra::{setup_context, SpcalContext};

pub fn spawn_context() -> SpcalContext {
    setup_context()
}

/// Stores a calendar item given as its SharePoint field set
pub fn create_appointment(ctx: &SpcalContext, fields: serde_json::Value) -> Appointment {
    let fields: AppointmentFields =
        serde_json::from_value(fields).expect("Expected valid field set");
    execute(CreateAppointmentUseCase { fields }, ctx).expect("Expected to create appointment")
}
