//! Core module - Configuration, errors and common types

mod config;
mod error;
mod types;

pub use config::{Config, DeviceConfig, HistoryConfig, InsightConfig, ServerConfig, TariffConfig, TariffTier};
pub use error::{ConnectError, Error, Result};
pub use types::{
    validate_appliance_input, ApplianceRecord, Category, CategorySummary, PushedReading,
    RelayAction, TelemetrySnapshot, POWER_WATTS_MAX, POWER_WATTS_MIN,
};
