use crate::shared::usecase::UseCase;
use spcal_domain::{Appointment, AppointmentError, AppointmentFields};
use spcal_infra::SpcalContext;

/// Assembles a raw calendar item and stores it
#[derive(Debug)]
pub struct CreateAppointmentUseCase {
    pub fields: AppointmentFields,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    InvalidFields(AppointmentError),
    StorageError(anyhow::Error),
}

impl UseCase for CreateAppointmentUseCase {
    type Response = Appointment;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "CreateAppointment";

    fn execute(&mut self, ctx: &SpcalContext) -> Result<Self::Response, Self::Errors> {
        let appointment =
            Appointment::from_fields(&self.fields).map_err(UseCaseErrors::InvalidFields)?;

        ctx.repos
            .appointments
            .insert(&appointment)
            .map_err(UseCaseErrors::StorageError)?;

        Ok(appointment)
    }
}
