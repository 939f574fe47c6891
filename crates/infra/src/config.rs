use spcal_domain::ExpansionSettings;
use std::{fmt::Display, str::FromStr};
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Number of instances generated for a series whose descriptor carries
    /// no end marker. SharePoint documents 999 as its ceiling.
    pub implicit_instance_cap: u32,
    /// Maximum number of instances generated for any single series.
    /// This is used to avoid expanding series with a huge repeat count
    /// which will take a lot of time to compute.
    pub max_instances: u16,
}

impl Config {
    pub fn new() -> Self {
        Self {
            implicit_instance_cap: read_env("SPCAL_IMPLICIT_INSTANCE_CAP", 999),
            max_instances: read_env("SPCAL_MAX_INSTANCES", u16::MAX),
        }
    }

    pub fn expansion_settings(&self) -> ExpansionSettings {
        ExpansionSettings {
            implicit_instance_cap: self.implicit_instance_cap,
            max_instances: self.max_instances,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

fn read_env<T: FromStr + Display>(name: &str, default: T) -> T {
    let value = match std::env::var(name) {
        Ok(value) => value,
        Err(_) => return default,
    };
    match value.trim().parse::<T>() {
        Ok(parsed) => parsed,
        Err(_) => {
            warn!(
                "The given {}: {} is not valid, falling back to the default: {}.",
                name, value, default
            );
            default
        }
    }
}
