//! Common types used across the application

use crate::core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed set of appliance categories as shown in the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "AC & Pendingin")]
    AcPendingin,
    #[serde(rename = "Elektronik")]
    Elektronik,
    #[serde(rename = "Penerangan")]
    Penerangan,
    #[serde(rename = "Dapur")]
    Dapur,
    #[serde(rename = "Lainnya")]
    Lainnya,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::AcPendingin,
        Category::Elektronik,
        Category::Penerangan,
        Category::Dapur,
        Category::Lainnya,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::AcPendingin => "AC & Pendingin",
            Category::Elektronik => "Elektronik",
            Category::Penerangan => "Penerangan",
            Category::Dapur => "Dapur",
            Category::Lainnya => "Lainnya",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One registered household appliance.
///
/// Energy and cost are snapshots taken at creation time with the tariff then
/// in effect; a later rate change does not rewrite existing records.
/// Field names on the wire match the legacy `data_listrik.json` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplianceRecord {
    /// User-supplied name, not required to be unique
    #[serde(rename = "nama")]
    pub name: String,
    /// Category label, absent when the user skipped it
    #[serde(rename = "kategori", default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    /// Rated power in watts (1..=5000)
    #[serde(rename = "daya")]
    pub power_watts: f64,
    /// Usage hours per day (0..=24)
    #[serde(rename = "jam")]
    pub hours_per_day: f64,
    /// Usage days per month (1..=31)
    #[serde(rename = "hari")]
    pub days_per_month: u32,
    /// Monthly energy in kWh, derived at creation
    #[serde(rename = "energi")]
    pub energy_kwh: f64,
    /// Monthly cost, derived at creation from the flat rate then in effect
    #[serde(rename = "biaya")]
    pub cost_amount: f64,
}

/// Bounds enforced when a record is created from manual input
pub const POWER_WATTS_MIN: f64 = 1.0;
pub const POWER_WATTS_MAX: f64 = 5000.0;

impl ApplianceRecord {
    /// Validate manual input and build a record, snapshotting energy and cost
    /// at the given rate.
    pub fn new(
        name: impl Into<String>,
        category: Option<Category>,
        power_watts: f64,
        hours_per_day: f64,
        days_per_month: u32,
        rate_per_kwh: f64,
    ) -> Result<Self> {
        let name = name.into();
        validate_appliance_input(&name, power_watts, hours_per_day, days_per_month)?;

        let (energy_kwh, cost_amount) = crate::tariff::compute_energy_and_cost(
            power_watts,
            hours_per_day,
            days_per_month,
            rate_per_kwh,
        );

        Ok(Self {
            name,
            category,
            power_watts,
            hours_per_day,
            days_per_month,
            energy_kwh,
            cost_amount,
        })
    }
}

/// Reject malformed manual input before a record is created.
///
/// The tariff arithmetic itself stays total; this is the single gate in front
/// of it.
pub fn validate_appliance_input(
    name: &str,
    power_watts: f64,
    hours_per_day: f64,
    days_per_month: u32,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::InvalidInput("appliance name must not be empty".to_string()));
    }
    if !power_watts.is_finite() || !(POWER_WATTS_MIN..=POWER_WATTS_MAX).contains(&power_watts) {
        return Err(Error::InvalidInput(format!(
            "power must be between {} and {} watts, got {}",
            POWER_WATTS_MIN, POWER_WATTS_MAX, power_watts
        )));
    }
    if !hours_per_day.is_finite() || !(0.0..=24.0).contains(&hours_per_day) {
        return Err(Error::InvalidInput(format!(
            "hours per day must be between 0 and 24, got {}",
            hours_per_day
        )));
    }
    if !(1..=31).contains(&days_per_month) {
        return Err(Error::InvalidInput(format!(
            "days per month must be between 1 and 31, got {}",
            days_per_month
        )));
    }
    Ok(())
}

/// One polled reading from the remote device.
///
/// Timestamped by us at receipt; the device has no authoritative clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Raw LDR (light sensor) value
    pub ldr: i64,
    /// Device-derived light status label
    #[serde(rename = "statusLDR")]
    pub ldr_status: String,
    /// Temperature in Celsius
    #[serde(rename = "suhu")]
    pub temperature: f64,
    /// Device-derived temperature status label
    #[serde(rename = "statusSuhu")]
    pub temperature_status: String,
    pub relay1: bool,
    pub relay2: bool,
    /// Unix timestamp stamped by the client at receipt
    pub received_at: i64,
}

/// One reading pushed by the ESP32 in server mode.
///
/// Shares the bounded-history model with polled snapshots; cost is computed
/// at ingest time from the session tariff. Wire names match the device
/// firmware payload and the legacy `data_esp32.json` layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushedReading {
    pub device_id: String,
    #[serde(rename = "lokasi", default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Mains voltage in volts
    #[serde(rename = "tegangan")]
    pub voltage: f64,
    /// Current draw in amperes
    #[serde(rename = "arus")]
    pub current: f64,
    /// Measured active power in watts
    #[serde(rename = "daya_aktual")]
    pub power_watts: f64,
    /// Accumulated energy in kWh as reported by the device
    #[serde(rename = "energi_kwh")]
    pub energy_kwh: f64,
    #[serde(rename = "faktor_daya", default, skip_serializing_if = "Option::is_none")]
    pub power_factor: Option<f64>,
    #[serde(rename = "suhu", default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(rename = "kelembapan", default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(rename = "cahaya", default, skip_serializing_if = "Option::is_none")]
    pub light: Option<i64>,
    /// Free-form relay status map as sent by the firmware
    #[serde(rename = "kontrol_status", default, skip_serializing_if = "Option::is_none")]
    pub control_status: Option<serde_json::Value>,
    /// Cost of the reported energy at the tariff in effect at ingest
    #[serde(rename = "biaya")]
    pub cost_amount: f64,
    /// Unix timestamp stamped at ingest
    pub received_at: i64,
}

/// Result of one relay command, kept in the bounded action log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayAction {
    /// Unix timestamp when the command was issued
    pub at: i64,
    /// Query string sent to the device (e.g. "r1=1")
    pub query: String,
    /// Raw confirmation text echoed by the device
    pub response: String,
}

/// Aggregate rollup for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Option<Category>,
    pub count: usize,
    pub energy_kwh: f64,
    pub cost_amount: f64,
}
