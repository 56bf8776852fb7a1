pub mod app_config;
pub mod calendar;
pub mod config;
pub mod listing;

pub use app_config::AppConfig;
pub use calendar::{DateTokens, Month, ReferenceYearWindow, Weekday};
pub use config::{load_app_config, load_app_config_from_env};
pub use listing::{
    location_key, AddressMapping, Coordinates, GeocodeResult, MarketRecord, RawListing,
    ResolvedAddress, RunSummary, ValidationIssue,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
