use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use crate::config::FlightApiConfig;
use crate::observability;

/// Whatever the remote service returns on success; opaque to this crate.
#[derive(Debug, Clone, PartialEq)]
pub struct CancelConfirmation(pub serde_json::Value);

#[derive(Debug)]
pub enum FlightApiError {
    /// Structured refusal from the remote service, carried verbatim.
    Rejected(String),
    /// Network/server failure; nothing may be assumed about remote state.
    Transport(String),
}

impl std::fmt::Display for FlightApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlightApiError::Rejected(msg) => write!(f, "flight service refused: {msg}"),
            FlightApiError::Transport(e) => write!(f, "flight service unreachable: {e}"),
        }
    }
}

impl std::error::Error for FlightApiError {}

/// The remote flight-booking system's cancellation capability. Only
/// cancellation is called from this crate; booking flights happens upstream.
#[async_trait]
pub trait FlightGateway: Send + Sync {
    async fn cancel(
        &self,
        booking_reference: &str,
        last_name: &str,
    ) -> Result<CancelConfirmation, FlightApiError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CancelBody<'a> {
    booking_reference: &'a str,
    last_name: &'a str,
}

#[derive(Deserialize)]
struct Refusal {
    error: String,
}

/// HTTP client for the AFS cancellation endpoint. Every request carries an
/// explicit timeout; a timeout is a transport failure like any other.
#[derive(Clone)]
pub struct AfsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: std::time::Duration,
}

impl AfsClient {
    pub fn new(config: &FlightApiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
        }
    }
}

#[async_trait]
impl FlightGateway for AfsClient {
    async fn cancel(
        &self,
        booking_reference: &str,
        last_name: &str,
    ) -> Result<CancelConfirmation, FlightApiError> {
        let start = std::time::Instant::now();
        let result = self
            .client
            .post(format!("{}/api/bookings/cancel", self.base_url))
            .header("x-api-key", &self.api_key)
            .timeout(self.timeout)
            .json(&CancelBody {
                booking_reference,
                last_name,
            })
            .send()
            .await;
        metrics::histogram!(observability::FLIGHT_API_DURATION_SECONDS)
            .record(start.elapsed().as_secs_f64());

        let response = result.map_err(|e| FlightApiError::Transport(e.to_string()))?;
        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            // A parseable 400 body is a business refusal; anything else is
            // a broken upstream.
            return match response.json::<Refusal>().await {
                Ok(refusal) => Err(FlightApiError::Rejected(refusal.error)),
                Err(_) => Err(FlightApiError::Transport(
                    "unreadable rejection from flight service".into(),
                )),
            };
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FlightApiError::Transport(format!(
                "flight service returned {status}: {body}"
            )));
        }
        response
            .json::<serde_json::Value>()
            .await
            .map(CancelConfirmation)
            .map_err(|e| FlightApiError::Transport(e.to_string()))
    }
}
