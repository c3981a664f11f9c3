//! HTTP client for the ESP32 monitoring device
//!
//! The device exposes exactly two endpoints:
//! - `GET /data` returns the current sensor/relay snapshot as JSON
//! - `GET /relay?r1=<0|1>&r2=<0|1>` switches relays and echoes a
//!   confirmation string; an omitted parameter leaves that relay untouched

use crate::core::{ConnectError, DeviceConfig, TelemetrySnapshot};
use rand::Rng;
use serde::Deserialize;
use std::time::Duration;

/// Raw `/data` payload. Firmware revisions differ in which fields they send,
/// so everything except the sensor core is defaulted rather than required.
#[derive(Debug, Deserialize)]
struct DataPayload {
    #[serde(default)]
    ldr: i64,
    #[serde(rename = "statusLDR", default = "default_status")]
    ldr_status: String,
    #[serde(rename = "suhu", default)]
    temperature: f64,
    #[serde(rename = "statusSuhu", default = "default_status")]
    temperature_status: String,
    #[serde(default)]
    relay1: u8,
    #[serde(default)]
    relay2: u8,
}

fn default_status() -> String {
    "unknown".to_string()
}

/// Client for a single remote monitoring device
#[derive(Clone)]
pub struct DeviceClient {
    base_url: String,
    client: reqwest::Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl DeviceClient {
    /// Create a client for `host` (host or host:port, no scheme)
    pub fn new(host: impl AsRef<str>, config: &DeviceConfig) -> Result<Self, ConnectError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConnectError::Unreachable(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: format!("http://{}", host.as_ref()),
            client,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Client with default settings for `host`
    pub fn for_host(host: impl AsRef<str>) -> Result<Self, ConnectError> {
        Self::new(host, &DeviceConfig::default())
    }

    /// Fetch the current sensor/relay snapshot.
    ///
    /// The snapshot is timestamped here at receipt; the device has no clock
    /// of its own.
    pub async fn fetch_snapshot(&self) -> Result<TelemetrySnapshot, ConnectError> {
        let url = format!("{}/data", self.base_url);
        log::debug!("Polling {}", url);

        let response = self
            .retry_transient(|| self.client.get(&url).send())
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectError::BadResponse(format!("status {}", status)));
        }

        let payload: DataPayload = response
            .json()
            .await
            .map_err(|e| ConnectError::BadResponse(format!("malformed JSON: {}", e)))?;

        Ok(TelemetrySnapshot {
            ldr: payload.ldr,
            ldr_status: payload.ldr_status,
            temperature: payload.temperature,
            temperature_status: payload.temperature_status,
            relay1: payload.relay1 != 0,
            relay2: payload.relay2 != 0,
            received_at: chrono::Utc::now().timestamp(),
        })
    }

    /// Switch relay channels and return the device's raw confirmation text.
    ///
    /// Only the channels the caller specified go on the wire: the firmware
    /// treats an omitted parameter as "leave that relay alone", so sending a
    /// default value here would clobber remote state.
    pub async fn set_relays(
        &self,
        r1: Option<bool>,
        r2: Option<bool>,
    ) -> Result<String, ConnectError> {
        let query = relay_query(r1, r2);
        let url = if query.is_empty() {
            format!("{}/relay", self.base_url)
        } else {
            format!("{}/relay?{}", self.base_url, query)
        };
        log::info!("Relay command: {}", url);

        let response = self
            .retry_transient(|| self.client.get(&url).send())
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectError::BadResponse(format!("status {}", status)));
        }

        response
            .text()
            .await
            .map_err(|e| ConnectError::BadResponse(format!("unreadable body: {}", e)))
    }

    /// Run a request, retrying transient transport failures up to the
    /// configured budget with a jittered delay. Responses the device actually
    /// produced (any status) are never retried here.
    async fn retry_transient<F, Fut>(&self, mut request_fn: F) -> Result<reqwest::Response, ConnectError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        let mut attempt = 0;
        loop {
            match request_fn().await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    let error = classify_transport_error(e);
                    if !error.is_transient() || attempt >= self.max_retries {
                        return Err(error);
                    }
                    attempt += 1;
                    let delay = jittered(self.retry_delay);
                    log::warn!(
                        "Transient device error ({}), retry {}/{} in {:?}",
                        error,
                        attempt,
                        self.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// Build the relay query string, including only the requested channels
pub(crate) fn relay_query(r1: Option<bool>, r2: Option<bool>) -> String {
    let mut parts = Vec::new();
    if let Some(on) = r1 {
        parts.push(format!("r1={}", if on { 1 } else { 0 }));
    }
    if let Some(on) = r2 {
        parts.push(format!("r2={}", if on { 1 } else { 0 }));
    }
    parts.join("&")
}

/// Map a reqwest transport failure onto our connectivity taxonomy
fn classify_transport_error(e: reqwest::Error) -> ConnectError {
    if e.is_timeout() {
        ConnectError::Timeout
    } else if e.is_connect() || e.is_request() {
        ConnectError::Unreachable(e.to_string())
    } else {
        ConnectError::BadResponse(e.to_string())
    }
}

/// Delay plus up to 50% random jitter, so simultaneous pollers desynchronize
fn jittered(base: Duration) -> Duration {
    let max_extra = (base.as_millis() / 2) as u64;
    let extra = if max_extra > 0 {
        rand::thread_rng().gen_range(0..=max_extra)
    } else {
        0
    };
    base + Duration::from_millis(extra)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host_of(server: &mockito::ServerGuard) -> String {
        server.url().trim_start_matches("http://").to_string()
    }

    #[tokio::test]
    async fn test_fetch_snapshot_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/data")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                serde_json::json!({
                    "ldr": 812,
                    "statusLDR": "Terang",
                    "suhu": 29.4,
                    "statusSuhu": "Normal",
                    "relay1": 1,
                    "relay2": 0
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = DeviceClient::for_host(host_of(&server)).unwrap();
        let snapshot = client.fetch_snapshot().await.unwrap();

        assert_eq!(snapshot.ldr, 812);
        assert_eq!(snapshot.ldr_status, "Terang");
        assert!((snapshot.temperature - 29.4).abs() < 1e-9);
        assert!(snapshot.relay1);
        assert!(!snapshot.relay2);
        assert!(snapshot.received_at > 0);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_snapshot_missing_fields_use_defaults() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data")
            .with_status(200)
            .with_body(r#"{"ldr": 100, "suhu": 25.0}"#)
            .create_async()
            .await;

        let client = DeviceClient::for_host(host_of(&server)).unwrap();
        let snapshot = client.fetch_snapshot().await.unwrap();

        assert_eq!(snapshot.ldr_status, "unknown");
        assert_eq!(snapshot.temperature_status, "unknown");
        assert!(!snapshot.relay1);
        assert!(!snapshot.relay2);
    }

    #[tokio::test]
    async fn test_fetch_snapshot_malformed_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/data")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let client = DeviceClient::for_host(host_of(&server)).unwrap();
        let result = client.fetch_snapshot().await;
        assert!(matches!(result, Err(ConnectError::BadResponse(_))));
    }

    #[tokio::test]
    async fn test_fetch_snapshot_unreachable_host() {
        // Nothing listens on port 1; connection is refused within the timeout
        let client = DeviceClient::for_host("127.0.0.1:1").unwrap();
        let result = client.fetch_snapshot().await;
        assert!(matches!(result, Err(ConnectError::Unreachable(_))));
    }

    #[tokio::test]
    async fn test_transient_failure_retried_up_to_budget() {
        // Nothing listens on port 1, so every attempt is Unreachable and the
        // full retry budget gets spent. Two retries at >=100ms base delay put
        // a floor under the elapsed time.
        let config = DeviceConfig {
            max_retries: 2,
            retry_delay_ms: 100,
            ..DeviceConfig::default()
        };
        let client = DeviceClient::new("127.0.0.1:1", &config).unwrap();

        let started = std::time::Instant::now();
        let result = client.fetch_snapshot().await;
        let elapsed = started.elapsed();

        assert!(matches!(result, Err(ConnectError::Unreachable(_))));
        assert!(
            elapsed >= Duration::from_millis(200),
            "expected two retry delays, elapsed only {:?}",
            elapsed
        );
    }

    #[tokio::test]
    async fn test_device_error_status_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/data")
            .with_status(500)
            .expect(1)
            .create_async()
            .await;

        let config = DeviceConfig {
            max_retries: 3,
            retry_delay_ms: 10,
            ..DeviceConfig::default()
        };
        let client = DeviceClient::new(host_of(&server), &config).unwrap();

        let result = client.fetch_snapshot().await;
        assert!(matches!(result, Err(ConnectError::BadResponse(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_relays_single_channel_omits_other() {
        let mut server = mockito::Server::new_async().await;
        // Exact query match: an r2 parameter on the wire would fail the match
        let mock = server
            .mock("GET", "/relay")
            .match_query(mockito::Matcher::Exact("r1=1".to_string()))
            .with_status(200)
            .with_body("Relay 1: ON")
            .create_async()
            .await;

        let client = DeviceClient::for_host(host_of(&server)).unwrap();
        let reply = client.set_relays(Some(true), None).await.unwrap();

        assert_eq!(reply, "Relay 1: ON");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_relays_both_channels() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/relay")
            .match_query(mockito::Matcher::Exact("r1=0&r2=1".to_string()))
            .with_status(200)
            .with_body("OK")
            .create_async()
            .await;

        let client = DeviceClient::for_host(host_of(&server)).unwrap();
        let reply = client.set_relays(Some(false), Some(true)).await.unwrap();

        assert_eq!(reply, "OK");
        mock.assert_async().await;
    }

    #[test]
    fn test_relay_query_building() {
        assert_eq!(relay_query(None, None), "");
        assert_eq!(relay_query(Some(true), None), "r1=1");
        assert_eq!(relay_query(None, Some(false)), "r2=0");
        assert_eq!(relay_query(Some(false), Some(true)), "r1=0&r2=1");
    }

    #[test]
    fn test_jitter_bounds() {
        let base = Duration::from_millis(100);
        for _ in 0..100 {
            let delay = jittered(base);
            assert!(delay >= base);
            assert!(delay <= base + Duration::from_millis(50));
        }
    }
}
