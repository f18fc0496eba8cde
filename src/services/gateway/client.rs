//! HTTP client for the remote stock data and prediction service

use super::messages::{ErrorEnvelope, HistoryEnvelope, PredictionEnvelope};
use crate::error::GatewayError;
use crate::models::series::{Horizon, Prediction, Symbol, Window};
use crate::services::market_data::{validate_records, HistorySnapshot, MarketDataGateway};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

pub struct HttpMarketDataGateway {
    client: Client,
    base_url: String,
}

impl HttpMarketDataGateway {
    /// Build a gateway with its own client; `timeout` of `None` waits indefinitely
    pub fn new(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, GatewayError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {}", e)))?;

        let base_url = base_url.into();
        Url::parse(&base_url)?;

        Ok(Self::with_client(base_url, client))
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = Url::parse(&self.base_url)?;
        url.path_segments_mut()
            .map_err(|_| GatewayError::Url(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a GET and return the body of a 2xx response
    async fn get_body(&self, url: Url) -> Result<String, GatewayError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| status_reason(status));
        warn!(
            url = %url,
            status = status.as_u16(),
            message = %message,
            "Gateway returned error status"
        );

        Err(GatewayError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

fn status_reason(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}

#[async_trait::async_trait]
impl MarketDataGateway for HttpMarketDataGateway {
    async fn fetch_history(
        &self,
        symbol: &Symbol,
        window: Window,
    ) -> Result<HistorySnapshot, GatewayError> {
        let mut url = self.endpoint(&["stock", "data", symbol.as_str()])?;
        let days = window.days().to_string();
        url.query_pairs_mut()
            .append_pair("limit", &days)
            .append_pair("days", &days);

        debug!(symbol = %symbol, window = window.days(), url = %url, "Fetching history");
        let body = self.get_body(url).await?;

        let envelope: HistoryEnvelope =
            serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;

        if !envelope.success {
            return Err(GatewayError::Rejected(
                envelope.message.unwrap_or_else(|| "No data found.".to_string()),
            ));
        }

        let data = match envelope.data {
            Some(data) if !data.records.is_empty() => data,
            _ => return Err(GatewayError::Empty(symbol.to_string())),
        };

        validate_records(&data.records)?;

        debug!(
            symbol = %symbol,
            count = data.records.len(),
            has_statistics = data.statistics.is_some(),
            "History fetched"
        );

        Ok(HistorySnapshot {
            records: data.records,
            statistics: data.statistics,
        })
    }

    async fn fetch_prediction(
        &self,
        symbol: &Symbol,
        horizon: Horizon,
    ) -> Result<Prediction, GatewayError> {
        let mut url = self.endpoint(&["stock", "predict", symbol.as_str()])?;
        url.query_pairs_mut().append_pair("horizon", horizon.as_str());

        debug!(symbol = %symbol, horizon = %horizon, url = %url, "Requesting prediction");
        let body = self.get_body(url).await?;

        let envelope: PredictionEnvelope =
            serde_json::from_str(&body).map_err(|e| GatewayError::Decode(e.to_string()))?;

        if !envelope.success {
            return Err(GatewayError::Rejected(
                envelope.message.unwrap_or_else(|| "Prediction failed.".to_string()),
            ));
        }

        let data = envelope
            .prediction
            .ok_or_else(|| GatewayError::Decode("missing prediction payload".to_string()))?;

        if !data.predicted_close.is_finite() {
            return Err(GatewayError::InvalidPayload(format!(
                "predicted_close is not a finite number: {}",
                data.predicted_close
            )));
        }

        if let Some(echoed) = data.horizon.as_deref() {
            if echoed != horizon.as_str() {
                warn!(
                    requested = %horizon,
                    echoed = %echoed,
                    "Prediction horizon mismatch, keeping requested horizon"
                );
            }
        }

        Ok(Prediction::new(data.predicted_close, horizon))
    }
}
