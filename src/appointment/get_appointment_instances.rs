use crate::shared::usecase::UseCase;
use spcal_domain::{Appointment, ExpansionError, RecurrenceInstance, TimeSpan, ID};
use spcal_infra::SpcalContext;

#[derive(Debug)]
pub struct GetAppointmentInstancesUseCase {
    pub appointment_id: ID,
    pub timespan: Option<TimeSpan>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    NotFound(ID),
    Expansion(ExpansionError),
}

#[derive(Debug)]
pub struct UseCaseResponse {
    pub appointment: Appointment,
    pub instances: Vec<RecurrenceInstance>,
}

impl UseCase for GetAppointmentInstancesUseCase {
    type Response = UseCaseResponse;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetAppointmentInstances";

    fn execute(&mut self, ctx: &SpcalContext) -> Result<Self::Response, Self::Errors> {
        let appointment = ctx
            .repos
            .appointments
            .find(&self.appointment_id)
            .ok_or(UseCaseErrors::NotFound(self.appointment_id))?;

        let exceptions = ctx.repos.appointments.find_exceptions(&appointment.id);
        let settings = ctx.config.expansion_settings();
        let instances = match &self.timespan {
            Some(timespan) => appointment.expand_in(timespan, &exceptions, &settings),
            None => appointment.expand(&exceptions, &settings),
        }
        .map_err(UseCaseErrors::Expansion)?;

        Ok(UseCaseResponse {
            appointment,
            instances,
        })
    }
}
