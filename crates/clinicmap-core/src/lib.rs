//! Shared domain types and configuration for the clinic location workspace.

mod app_config;
pub mod cache;
mod config;
pub mod location;
pub mod states;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, ServiceBounds};
pub use cache::TtlCache;
pub use config::{load_app_config, load_app_config_from_env};
pub use location::{Coordinates, LocationRecord};
pub use states::{StateTable, US_STATES};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
