mod config;
mod repos;

pub use config::Config;
pub use repos::{IAppointmentRepo, Repos};

#[derive(Clone)]
pub struct SpcalContext {
    pub repos: Repos,
    pub config: Config,
}

impl SpcalContext {
    pub fn create_inmemory() -> Self {
        Self {
            repos: Repos::create_inmemory(),
            config: Config::new(),
        }
    }
}

/// Will setup the infrastructure context given the environment
pub fn setup_context() -> SpcalContext {
    SpcalContext::create_inmemory()
}
