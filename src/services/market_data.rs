//! Market data gateway interface consumed by the fetch controller.

use crate::error::GatewayError;
use crate::models::series::{Horizon, Prediction, PriceRecord, Statistics, Symbol, Window};

/// Records and server-side statistics for one (symbol, window) pair
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    pub records: Vec<PriceRecord>,
    pub statistics: Option<Statistics>,
}

#[async_trait::async_trait]
pub trait MarketDataGateway: Send + Sync {
    /// Fetch the trailing `window` of daily records for a symbol.
    ///
    /// Implementations must return records strictly ascending by date and
    /// report an empty result as [`GatewayError::Empty`].
    async fn fetch_history(
        &self,
        symbol: &Symbol,
        window: Window,
    ) -> Result<HistorySnapshot, GatewayError>;

    /// Request a forward close estimate for a symbol
    async fn fetch_prediction(
        &self,
        symbol: &Symbol,
        horizon: Horizon,
    ) -> Result<Prediction, GatewayError>;
}

/// Check the ordering and value contract of a record set
pub fn validate_records(records: &[PriceRecord]) -> Result<(), GatewayError> {
    if let Some(bad) = records.iter().find(|r| !r.has_valid_prices()) {
        return Err(GatewayError::InvalidPayload(format!(
            "record for {} has a negative or non-finite price",
            bad.date
        )));
    }

    for pair in records.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(GatewayError::InvalidPayload(format!(
                "records are not strictly ascending ({} followed by {})",
                pair[0].date, pair[1].date
            )));
        }
    }

    Ok(())
}
