//! Text-insight boundary
//!
//! Recommendations beyond the built-in heuristics come from an external
//! webhook whose response format is unstable. The whole thing hides behind
//! [`TextInsightProvider`]: callers get an opaque string and consumer-side
//! parsing stays best-effort by design.

use crate::core::{ConnectError, Error, InsightConfig, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Consumption summary posted to the insight webhook.
///
/// Wire names match what the legacy dashboard sends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumptionSummary {
    pub total_kwh: f64,
    #[serde(rename = "total_biaya")]
    pub total_cost: f64,
    #[serde(rename = "alat_listrik")]
    pub appliances: Vec<String>,
}

/// Source of free-text energy advice
pub trait TextInsightProvider {
    /// Produce advice text for the given consumption summary
    fn insight(
        &self,
        summary: &ConsumptionSummary,
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Webhook-backed insight provider
#[derive(Clone)]
pub struct WebhookInsightProvider {
    url: String,
    client: reqwest::Client,
}

impl WebhookInsightProvider {
    /// Build a provider from config; `None` when no webhook URL is set
    pub fn from_config(config: &InsightConfig) -> Result<Option<Self>> {
        let Some(url) = config.webhook_url.clone() else {
            return Ok(None);
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Some(Self { url, client }))
    }

    pub fn new(url: impl Into<String>) -> Result<Self> {
        let config = InsightConfig {
            webhook_url: Some(url.into()),
            ..InsightConfig::default()
        };
        Ok(Self::from_config(&config)?.expect("url was set"))
    }
}

impl TextInsightProvider for WebhookInsightProvider {
    async fn insight(&self, summary: &ConsumptionSummary) -> Result<String> {
        log::info!("Requesting insight for {:.1} kWh", summary.total_kwh);

        let response = self
            .client
            .post(&self.url)
            .json(summary)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Connect(ConnectError::Timeout)
                } else {
                    Error::Connect(ConnectError::Unreachable(e.to_string()))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Connect(ConnectError::BadResponse(format!(
                "insight webhook returned status {}",
                status
            ))));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::Connect(ConnectError::BadResponse(e.to_string())))?;

        Ok(extract_content(&body))
    }
}

/// Pull a `content` field out of the response if one can be found, falling
/// back to the raw body. The provider's format has changed before and will
/// change again.
fn extract_content(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    fn content_of(value: &Value) -> Option<String> {
        match value {
            Value::Object(map) => match map.get("content") {
                Some(Value::String(s)) => Some(s.clone()),
                Some(other) => content_of(other),
                None => map.values().find_map(content_of),
            },
            Value::Array(items) => items.iter().find_map(content_of),
            _ => None,
        }
    }

    match content_of(&value) {
        Some(content) if !content.trim().is_empty() => content,
        _ => body.trim().to_string(),
    }
}
