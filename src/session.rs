//! Per-session monitoring state
//!
//! The tariff schedule, appliance registry and history buffers live in one
//! explicit context object handed to each operation. Serving multiple users
//! means one `MonitorSession` per user; nothing in the library is a process
//! global.

use crate::core::{
    Config, ConnectError, PushedReading, RelayAction, TelemetrySnapshot,
};
use crate::insight::ConsumptionSummary;
use crate::registry::DeviceRegistry;
use crate::tariff::TariffSchedule;
use crate::telemetry::{DeviceClient, History};

/// All mutable state for one monitoring session
#[derive(Debug, Clone)]
pub struct MonitorSession {
    pub tariff: TariffSchedule,
    pub registry: DeviceRegistry,
    /// Polled device snapshots, oldest evicted first
    pub snapshots: History<TelemetrySnapshot>,
    /// Readings pushed by the device in server mode
    pub readings: History<PushedReading>,
    /// Relay command log
    pub actions: History<RelayAction>,
}

impl MonitorSession {
    pub fn new(config: &Config) -> Self {
        Self {
            tariff: TariffSchedule::new(&config.tariff),
            registry: DeviceRegistry::new(),
            snapshots: History::new(config.history.snapshot_capacity),
            readings: History::new(config.history.push_capacity),
            actions: History::new(config.history.action_capacity),
        }
    }

    /// Poll the device once and append the snapshot to the session history
    pub async fn poll(&mut self, client: &DeviceClient) -> Result<&TelemetrySnapshot, ConnectError> {
        let snapshot = client.fetch_snapshot().await?;
        self.snapshots.push(snapshot);
        Ok(self.snapshots.latest().expect("just pushed"))
    }

    /// Issue a relay command and log the device's confirmation
    pub async fn command_relays(
        &mut self,
        client: &DeviceClient,
        r1: Option<bool>,
        r2: Option<bool>,
    ) -> Result<&RelayAction, ConnectError> {
        let query = crate::telemetry::relay_query(r1, r2);
        let response = client.set_relays(r1, r2).await?;
        self.actions.push(RelayAction {
            at: chrono::Utc::now().timestamp(),
            query,
            response,
        });
        Ok(self.actions.latest().expect("just pushed"))
    }

    /// Append a pushed reading (ingestion server path)
    pub fn record_reading(&mut self, reading: PushedReading) {
        self.readings.push(reading);
    }

    /// Summarize registered consumption for the insight provider
    pub fn consumption_summary(&self) -> ConsumptionSummary {
        ConsumptionSummary {
            total_kwh: self.registry.total_energy(),
            total_cost: self.registry.total_cost(),
            appliances: self
                .registry
                .records()
                .iter()
                .map(|r| r.name.clone())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ApplianceRecord;

    #[test]
    fn test_session_capacities_from_config() {
        let config = Config::default();
        let session = MonitorSession::new(&config);
        assert_eq!(session.snapshots.capacity(), 50);
        assert_eq!(session.readings.capacity(), 50);
        assert_eq!(session.actions.capacity(), 20);
    }

    #[test]
    fn test_consumption_summary() {
        let mut session = MonitorSession::new(&Config::default());
        session.registry.add(
            ApplianceRecord::new("Kulkas", None, 150.0, 24.0, 30, session.tariff.rate_per_kwh())
                .unwrap(),
        );
        session.registry.add(
            ApplianceRecord::new("TV", None, 100.0, 5.0, 30, session.tariff.rate_per_kwh())
                .unwrap(),
        );

        let summary = session.consumption_summary();
        assert!((summary.total_kwh - 123.0).abs() < 1e-9);
        assert_eq!(summary.appliances, vec!["Kulkas", "TV"]);
    }

    #[tokio::test]
    async fn test_poll_appends_to_history() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data")
            .with_status(200)
            .with_body(r#"{"ldr": 1, "statusLDR": "Gelap", "suhu": 30.0, "statusSuhu": "Panas", "relay1": 0, "relay2": 1}"#)
            .expect(2)
            .create_async()
            .await;

        let host = server.url().trim_start_matches("http://").to_string();
        let client = DeviceClient::for_host(host).unwrap();
        let mut session = MonitorSession::new(&Config::default());

        session.poll(&client).await.unwrap();
        session.poll(&client).await.unwrap();

        assert_eq!(session.snapshots.len(), 2);
        assert!(session.snapshots.latest().unwrap().relay2);
    }

    #[tokio::test]
    async fn test_command_relays_logged() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/relay")
            .match_query(mockito::Matcher::Exact("r2=1".to_string()))
            .with_status(200)
            .with_body("Relay 2: ON")
            .create_async()
            .await;

        let host = server.url().trim_start_matches("http://").to_string();
        let client = DeviceClient::for_host(host).unwrap();
        let mut session = MonitorSession::new(&Config::default());

        let action = session.command_relays(&client, None, Some(true)).await.unwrap();
        assert_eq!(action.query, "r2=1");
        assert_eq!(action.response, "Relay 2: ON");
        assert_eq!(session.actions.len(), 1);
    }
}
