use crate::shared::usecase::UseCase;
use spcal_domain::{expand_series, ExpansionError, RecurrenceInstance, TimeSpan};
use spcal_infra::SpcalContext;

/// Expands every stored appointment, optionally restricted to a timespan
#[derive(Debug)]
pub struct GetCalendarInstancesUseCase {
    pub timespan: Option<TimeSpan>,
}

#[derive(Debug)]
pub enum UseCaseErrors {
    Expansion(ExpansionError),
}

#[derive(Debug)]
pub struct UseCaseResponse {
    pub instances: Vec<RecurrenceInstance>,
}

impl UseCase for GetCalendarInstancesUseCase {
    type Response = UseCaseResponse;

    type Errors = UseCaseErrors;

    const NAME: &'static str = "GetCalendarInstances";

    fn execute(&mut self, ctx: &SpcalContext) -> Result<Self::Response, Self::Errors> {
        let appointments = ctx.repos.appointments.find_all();
        let mut instances = expand_series(&appointments, &ctx.config.expansion_settings())
            .map_err(UseCaseErrors::Expansion)?;

        if let Some(timespan) = &self.timespan {
            instances.retain(|instance| timespan.overlaps(instance.start, instance.end));
        }

        Ok(UseCaseResponse { instances })
    }
}
