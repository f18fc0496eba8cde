//! Wire schemas for the remote data service

use crate::models::series::{PriceRecord, Statistics};
use serde::{Deserialize, Serialize};

/// `GET /stock/data/{symbol}` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<HistoryData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryData {
    #[serde(default)]
    pub records: Vec<PriceRecord>,
    #[serde(default)]
    pub statistics: Option<Statistics>,
}

/// `GET /stock/predict/{symbol}` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction: Option<PredictionData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionData {
    pub predicted_close: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizon: Option<String>,
}

/// Error bodies only need the message, whatever else they carry
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub message: Option<String>,
}
