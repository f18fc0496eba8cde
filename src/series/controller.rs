//! Fetch controller: drives history and prediction requests against the gateway

use super::projection::{ChartKind, ProjectedSeries, SeriesView};
use super::store::{SeriesSnapshot, SeriesStore};
use crate::error::ViewError;
use crate::models::series::{Horizon, LinePoint, PlottingPoint, Symbol, Window};
use crate::services::market_data::MarketDataGateway;
use std::sync::Arc;
use tracing::{info, warn};

/// Orchestrates remote calls and keeps the [`SeriesStore`] consistent with the
/// latest request.
///
/// Remote failures never escape: they are categorized and recorded in the store.
/// The `Err` returned by commands only reports local input validation.
#[derive(Clone)]
pub struct FetchController {
    gateway: Arc<dyn MarketDataGateway>,
    store: Arc<SeriesStore>,
}

impl FetchController {
    pub fn new(gateway: Arc<dyn MarketDataGateway>, store: Arc<SeriesStore>) -> Self {
        Self { gateway, store }
    }

    pub fn with_window(gateway: Arc<dyn MarketDataGateway>, window: Window) -> Self {
        Self::new(gateway, Arc::new(SeriesStore::new(window)))
    }

    pub fn store(&self) -> &Arc<SeriesStore> {
        &self.store
    }

    /// Fetch history for a (symbol, window) pair and replace the store contents
    pub async fn load_history(&self, symbol: Symbol, window: Window) {
        let guard = self.store.begin_history(symbol.clone(), window);
        let generation = guard.generation();
        info!(symbol = %symbol, window = window.days(), generation, "Loading history");

        let result = self
            .gateway
            .fetch_history(&symbol, window)
            .await
            .map_err(|e| {
                let error = ViewError::from_history_failure(symbol.as_str(), &e);
                warn!(
                    symbol = %symbol,
                    window = window.days(),
                    generation,
                    kind = %error.kind,
                    error = %e,
                    "History fetch failed"
                );
                error
            });

        let count = result.as_ref().map(|s| s.records.len()).unwrap_or(0);
        if guard.finish(result) {
            info!(symbol = %symbol, window = window.days(), generation, count, "History applied");
        }
    }

    /// Normalize a raw symbol and load it with the current window
    pub async fn set_symbol(&self, raw: &str) -> Result<(), ViewError> {
        let symbol = Symbol::parse(raw)?;
        let window = self.store.window();
        self.load_history(symbol, window).await;
        Ok(())
    }

    /// Switch window; reloads when a symbol is already selected
    pub async fn set_window(&self, days: u32) -> Result<(), ViewError> {
        let window = Window::from_days(days)?;
        match self.store.symbol() {
            Some(symbol) => self.load_history(symbol, window).await,
            None => self.store.select_window(window),
        }
        Ok(())
    }

    /// Reload the current pair. Any prediction is dropped with the old data.
    pub async fn refresh(&self) -> Result<(), ViewError> {
        let symbol = self
            .store
            .symbol()
            .ok_or_else(|| ViewError::invalid_request("No symbol selected to refresh"))?;
        let window = self.store.window();
        self.load_history(symbol, window).await;
        Ok(())
    }

    /// Request a forward estimate for the current symbol.
    ///
    /// Callers should only do this once history is loaded; a prediction that
    /// arrives without loaded history, or after a reload, is discarded.
    pub async fn request_prediction(&self, horizon: Horizon) -> Result<(), ViewError> {
        let guard = self.store.begin_prediction()?;
        let symbol = guard.ticket().symbol.clone();
        info!(symbol = %symbol, horizon = %horizon, "Requesting prediction");

        let result = self
            .gateway
            .fetch_prediction(&symbol, horizon)
            .await
            .map_err(|e| {
                let error = ViewError::from_prediction_failure(symbol.as_str(), &e);
                warn!(symbol = %symbol, horizon = %horizon, error = %e, "Prediction failed");
                error
            });

        let predicted_close = result.as_ref().ok().map(|p| p.predicted_close);
        if guard.finish(result) {
            if let Some(value) = predicted_close {
                info!(
                    symbol = %symbol,
                    horizon = %horizon,
                    predicted_close = value,
                    "Prediction applied"
                );
            }
        }
        Ok(())
    }

    pub fn current_state(&self) -> SeriesSnapshot {
        self.store.snapshot()
    }

    pub fn view(&self) -> SeriesView {
        SeriesView::from_snapshot(&self.store.snapshot())
    }

    pub fn as_candlestick(&self) -> Vec<PlottingPoint> {
        self.view().as_candlestick().to_vec()
    }

    pub fn as_line_series(&self) -> Vec<LinePoint> {
        self.view().as_line_series()
    }

    pub fn render(&self, kind: ChartKind) -> ProjectedSeries {
        self.view().render(kind)
    }
}
