//! Push-mode ingestion server
//!
//! Instead of being polled, the ESP32 can POST its readings here. The server
//! shares the session data model with the polling path, so pushed readings
//! land in the same kind of bounded history with the same eviction policy.
//!
//! Endpoints:
//! - `GET /` plaintext liveness message
//! - `GET /status` record count and server time
//! - `POST /api/esp32-data` validated reading ingest

use crate::core::PushedReading;
use crate::session::MonitorSession;
use crate::store::JsonStore;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Shared server state
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<MonitorSession>>,
    /// Wholesale JSON persistence; `None` runs memory-only
    pub store: Option<Arc<JsonStore>>,
}

impl AppState {
    pub fn new(session: MonitorSession, store: Option<JsonStore>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            store: store.map(Arc::new),
        }
    }
}

/// Incoming ESP32 payload before validation. Everything is optional at the
/// serde level so field checks produce our own 400 body instead of a generic
/// deserializer message.
#[derive(Debug, Deserialize)]
struct EspDataRequest {
    device_id: Option<String>,
    #[serde(rename = "lokasi")]
    location: Option<String>,
    #[serde(rename = "tegangan")]
    voltage: Option<f64>,
    #[serde(rename = "arus")]
    current: Option<f64>,
    #[serde(rename = "daya_aktual")]
    power_watts: Option<f64>,
    #[serde(rename = "energi_kwh")]
    energy_kwh: Option<f64>,
    #[serde(rename = "faktor_daya")]
    power_factor: Option<f64>,
    #[serde(rename = "suhu")]
    temperature: Option<f64>,
    #[serde(rename = "kelembapan")]
    humidity: Option<f64>,
    #[serde(rename = "cahaya")]
    light: Option<i64>,
    #[serde(rename = "kontrol_status")]
    control_status: Option<Value>,
}

impl EspDataRequest {
    /// Check the required-field set and numeric sanity
    fn validate(&self) -> Result<(), String> {
        let mut missing = Vec::new();
        if self.device_id.as_deref().map_or(true, |s| s.trim().is_empty()) {
            missing.push("device_id");
        }
        if self.voltage.is_none() {
            missing.push("tegangan");
        }
        if self.current.is_none() {
            missing.push("arus");
        }
        if self.power_watts.is_none() {
            missing.push("daya_aktual");
        }
        if self.energy_kwh.is_none() {
            missing.push("energi_kwh");
        }
        if !missing.is_empty() {
            return Err(format!("missing required fields: {}", missing.join(", ")));
        }

        for (name, value) in [
            ("tegangan", self.voltage),
            ("arus", self.current),
            ("daya_aktual", self.power_watts),
            ("energi_kwh", self.energy_kwh),
        ] {
            let value = value.expect("checked above");
            if !value.is_finite() || value < 0.0 {
                return Err(format!("field {} must be a non-negative number", name));
            }
        }

        Ok(())
    }
}

/// Build the ingestion router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/status", get(status))
        .route("/api/esp32-data", post(ingest))
        .with_state(state)
}

async fn root() -> &'static str {
    "Home Energy Monitor ingestion server is running"
}

async fn status(State(state): State<AppState>) -> Json<Value> {
    let session = state.session.lock().await;
    Json(json!({
        "status": "ok",
        "total_records": session.readings.len(),
        "timestamp": chrono::Utc::now().timestamp(),
    }))
}

fn error_body(message: impl Into<String>) -> Json<Value> {
    Json(json!({ "status": "error", "message": message.into() }))
}

/// Ingest one pushed reading.
///
/// The body is parsed by hand so both malformed JSON and missing fields come
/// back as a 400 with the documented `{status, message}` shape.
async fn ingest(State(state): State<AppState>, body: String) -> (StatusCode, Json<Value>) {
    let request: EspDataRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            log::warn!("Rejected unparseable push payload: {}", e);
            return (StatusCode::BAD_REQUEST, error_body(format!("invalid JSON: {}", e)));
        }
    };

    if let Err(message) = request.validate() {
        log::warn!("Rejected push payload: {}", message);
        return (StatusCode::BAD_REQUEST, error_body(message));
    }

    let mut session = state.session.lock().await;

    let energy_kwh = request.energy_kwh.expect("validated");
    let reading = PushedReading {
        device_id: request.device_id.expect("validated"),
        location: request.location,
        voltage: request.voltage.expect("validated"),
        current: request.current.expect("validated"),
        power_watts: request.power_watts.expect("validated"),
        energy_kwh,
        power_factor: request.power_factor,
        temperature: request.temperature,
        humidity: request.humidity,
        light: request.light,
        control_status: request.control_status,
        // Cost uses the tariff in effect right now; later rate changes do
        // not rewrite stored readings
        cost_amount: session.tariff.flat_cost(energy_kwh),
        received_at: chrono::Utc::now().timestamp(),
    };

    // Persist first: a failed save must leave the in-memory history
    // untouched, otherwise a device that resends on 500 duplicates the
    // reading. The persisted list mirrors what the history will hold after
    // the push, eviction included.
    if let Some(store) = &state.store {
        let mut persisted = session.readings.to_vec();
        persisted.push(reading.clone());
        if persisted.len() > session.readings.capacity() {
            persisted.remove(0);
        }
        if let Err(e) = store.save_readings(&persisted) {
            log::error!("Failed to persist telemetry history: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body(format!("failed to persist reading: {}", e)),
            );
        }
    }

    log::info!(
        "Ingested reading from {} ({:.1} W, {:.6} kWh)",
        reading.device_id,
        reading.power_watts,
        reading.energy_kwh
    );
    session.record_reading(reading);
    let record_count = session.readings.len();

    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "message": "data received",
            "record_count": record_count,
        })),
    )
}
