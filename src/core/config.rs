//! Configuration management

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tariff: TariffConfig,
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub insight: InsightConfig,
}

impl Config {
    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

        let app_config_dir = config_dir.join("home-energy-monitor");

        if !app_config_dir.exists() {
            fs::create_dir_all(&app_config_dir)?;
        }

        Ok(app_config_dir.join("config.toml"))
    }

    /// Load configuration from disk, creating a default file on first run
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// One band of the progressive tariff: everything up to `upto_kwh` (or the
/// remainder, when absent) is billed at `rate_per_kwh`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffTier {
    /// Upper band boundary in kWh; `None` marks the open-ended top band
    pub upto_kwh: Option<f64>,
    pub rate_per_kwh: f64,
}

/// Tariff settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffConfig {
    /// Flat rate per kWh used for per-appliance cost snapshots
    #[serde(default = "default_rate")]
    pub rate_per_kwh: f64,
    /// Progressive band table for whole-household billing
    #[serde(default = "default_tiers")]
    pub tiers: Vec<TariffTier>,
    /// kg CO2 emitted per kWh
    #[serde(default = "default_emission_factor")]
    pub emission_factor: f64,
    /// Currency symbol for display
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_rate() -> f64 { 1500.0 }
fn default_emission_factor() -> f64 { 0.85 }
fn default_currency_symbol() -> String { "Rp".to_string() }

fn default_tiers() -> Vec<TariffTier> {
    vec![
        TariffTier { upto_kwh: Some(50.0), rate_per_kwh: 1000.0 },
        TariffTier { upto_kwh: Some(100.0), rate_per_kwh: 1200.0 },
        TariffTier { upto_kwh: Some(200.0), rate_per_kwh: 1500.0 },
        TariffTier { upto_kwh: None, rate_per_kwh: 2000.0 },
    ]
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            rate_per_kwh: default_rate(),
            tiers: default_tiers(),
            emission_factor: default_emission_factor(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

/// Remote device settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Device host or host:port, without scheme
    #[serde(default = "default_device_host")]
    pub host: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra attempts for transient failures (0 = single attempt)
    #[serde(default)]
    pub max_retries: u32,
    /// Base delay between retries in milliseconds, jittered per attempt
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

fn default_device_host() -> String { "192.168.4.1".to_string() }
fn default_timeout_secs() -> u64 { 4 }
fn default_retry_delay_ms() -> u64 { 500 }

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            host: default_device_host(),
            timeout_secs: default_timeout_secs(),
            max_retries: 0,
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Bounded history capacities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Polled snapshot buffer size
    #[serde(default = "default_snapshot_capacity")]
    pub snapshot_capacity: usize,
    /// Relay action log size
    #[serde(default = "default_action_capacity")]
    pub action_capacity: usize,
    /// Pushed reading buffer size (ingestion server)
    #[serde(default = "default_snapshot_capacity")]
    pub push_capacity: usize,
}

fn default_snapshot_capacity() -> usize { 50 }
fn default_action_capacity() -> usize { 20 }

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            snapshot_capacity: default_snapshot_capacity(),
            action_capacity: default_action_capacity(),
            push_capacity: default_snapshot_capacity(),
        }
    }
}

/// Ingestion server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_bind_host(),
            port: default_port(),
        }
    }
}

/// Insight webhook settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightConfig {
    /// Webhook endpoint; insight calls are skipped when unset
    #[serde(default)]
    pub webhook_url: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_insight_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_insight_timeout_secs() -> u64 { 10 }

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: default_insight_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tiers_match_schedule() {
        let config = TariffConfig::default();
        assert_eq!(config.tiers.len(), 4);
        assert_eq!(config.tiers[0].upto_kwh, Some(50.0));
        assert_eq!(config.tiers[3].upto_kwh, None);
        assert_eq!(config.tiers[3].rate_per_kwh, 2000.0);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [device]
            host = "10.0.0.7"
            "#,
        )
        .unwrap();
        assert_eq!(config.device.host, "10.0.0.7");
        assert_eq!(config.device.timeout_secs, 4);
        assert_eq!(config.tariff.rate_per_kwh, 1500.0);
        assert_eq!(config.server.port, 8000);
    }
}
