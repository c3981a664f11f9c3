//! Home Energy Monitor - ingestion server entry point
//!
//! Runs the push-mode HTTP server that receives ESP32 readings, prices them
//! with the configured tariff and keeps a bounded, persisted history.

use anyhow::Context;
use home_energy_monitor::core::Config;
use home_energy_monitor::server::{create_router, AppState};
use home_energy_monitor::session::MonitorSession;
use home_energy_monitor::store::JsonStore;
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Home Energy Monitor v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config, using defaults: {}", e);
        Config::default()
    });

    let store = match JsonStore::new() {
        Ok(store) => Some(store),
        Err(e) => {
            log::warn!("Persistence unavailable, running memory-only: {}", e);
            None
        }
    };

    let mut session = MonitorSession::new(&config);
    if let Some(store) = &store {
        match store.load_appliances() {
            Ok(records) => {
                log::info!("Loaded {} appliance records", records.len());
                session.registry.replace_all(records);
            }
            Err(e) => log::warn!("Could not load appliance records: {}", e),
        }
        match store.load_readings() {
            Ok(readings) => {
                log::info!("Loaded {} telemetry readings", readings.len());
                session.readings.replace_all(readings);
            }
            Err(e) => log::warn!("Could not load telemetry history: {}", e),
        }
    }

    let state = AppState::new(session, store);
    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid server address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    log::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
