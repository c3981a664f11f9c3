//! Home Energy Monitor library
//!
//! Core logic behind the energy dashboard: tariff arithmetic, the appliance
//! registry, the ESP32 polling client and the push-mode ingestion server.
//! Presentation is someone else's job; everything here returns typed values
//! and recoverable errors.

pub mod core;
pub mod insight;
pub mod registry;
pub mod server;
pub mod session;
pub mod store;
pub mod tariff;
pub mod telemetry;
