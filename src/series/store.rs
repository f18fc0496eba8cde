//! Series store: the single source of truth the views render from.
//!
//! All mutation goes through generation-checked transitions so a response for a
//! superseded (symbol, window) pair can never land after a newer request was issued.

use crate::error::{ErrorKind, ViewError};
use crate::models::series::{Prediction, PriceRecord, Statistics, Symbol, Window};
use crate::services::market_data::HistorySnapshot;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesStatus {
    Empty,
    Loading,
    Ready,
    Error,
}

/// Read-only copy of the store handed to renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSnapshot {
    pub status: SeriesStatus,
    pub symbol: Option<Symbol>,
    pub window: Window,
    pub records: Vec<PriceRecord>,
    pub statistics: Option<Statistics>,
    pub prediction: Option<Prediction>,
    pub error: Option<ViewError>,
    pub loading: bool,
    pub predicting: bool,
    pub generation: u64,
}

#[derive(Debug)]
struct SeriesState {
    status: SeriesStatus,
    symbol: Option<Symbol>,
    window: Window,
    records: Vec<PriceRecord>,
    statistics: Option<Statistics>,
    prediction: Option<Prediction>,
    error: Option<ViewError>,
    generation: u64,
    prediction_token: u64,
    predicting: bool,
}

impl SeriesState {
    fn clear_data(&mut self) {
        self.records.clear();
        self.statistics = None;
        self.prediction = None;
    }

    fn clear_error_of(&mut self, kind: ErrorKind) {
        if self.error.as_ref().map(|e| e.kind) == Some(kind) {
            self.error = None;
        }
    }
}

/// Identifies one in-flight prediction request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionTicket {
    pub token: u64,
    pub generation: u64,
    pub symbol: Symbol,
}

pub struct SeriesStore {
    state: RwLock<SeriesState>,
}

impl SeriesStore {
    pub fn new(window: Window) -> Self {
        Self {
            state: RwLock::new(SeriesState {
                status: SeriesStatus::Empty,
                symbol: None,
                window,
                records: Vec::new(),
                statistics: None,
                prediction: None,
                error: None,
                generation: 0,
                prediction_token: 0,
                predicting: false,
            }),
        }
    }

    pub fn snapshot(&self) -> SeriesSnapshot {
        let state = self.state.read();
        SeriesSnapshot {
            status: state.status,
            symbol: state.symbol.clone(),
            window: state.window,
            records: state.records.clone(),
            statistics: state.statistics.clone(),
            prediction: state.prediction.clone(),
            error: state.error.clone(),
            loading: state.status == SeriesStatus::Loading,
            predicting: state.predicting,
            generation: state.generation,
        }
    }

    pub fn status(&self) -> SeriesStatus {
        self.state.read().status
    }

    pub fn symbol(&self) -> Option<Symbol> {
        self.state.read().symbol.clone()
    }

    pub fn window(&self) -> Window {
        self.state.read().window
    }

    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Remember a window before any symbol is chosen
    pub fn select_window(&self, window: Window) {
        self.state.write().window = window;
    }

    /// Enter `loading` for a new (symbol, window) pair.
    ///
    /// Records, statistics, prediction and error are dropped; any response still
    /// in flight for an older generation becomes stale.
    pub fn begin_history(&self, symbol: Symbol, window: Window) -> HistoryGuard<'_> {
        let mut state = self.state.write();
        state.generation += 1;
        state.status = SeriesStatus::Loading;
        state.symbol = Some(symbol);
        state.window = window;
        state.error = None;
        state.clear_data();

        HistoryGuard {
            store: self,
            generation: state.generation,
            armed: true,
        }
    }

    /// Apply a history result if `generation` is still current.
    ///
    /// Returns whether the result was applied.
    pub fn complete_history(
        &self,
        generation: u64,
        result: Result<HistorySnapshot, ViewError>,
    ) -> bool {
        let mut state = self.state.write();
        if state.generation != generation {
            debug!(
                stale = generation,
                current = state.generation,
                "Discarding stale history response"
            );
            return false;
        }

        match result {
            Ok(snapshot) if !snapshot.records.is_empty() => {
                state.records = snapshot.records;
                state.statistics = snapshot.statistics;
                state.prediction = None;
                state.error = None;
                state.status = SeriesStatus::Ready;
            }
            Ok(_) => {
                let symbol = state
                    .symbol
                    .as_ref()
                    .map(|s| s.to_string())
                    .unwrap_or_default();
                state.clear_data();
                state.error = Some(ViewError::new(
                    ErrorKind::NotFound,
                    format!("No data found for {}", symbol),
                ));
                state.status = SeriesStatus::Error;
            }
            Err(err) => {
                state.clear_data();
                state.error = Some(err);
                state.status = SeriesStatus::Error;
            }
        }
        true
    }

    fn abandon_history(&self, generation: u64) {
        let mut state = self.state.write();
        if state.generation == generation && state.status == SeriesStatus::Loading {
            debug!(generation, "History request dropped before completion");
            state.clear_data();
            state.error = Some(ViewError::new(
                ErrorKind::NetworkFailure,
                "History request was abandoned before a response arrived",
            ));
            state.status = SeriesStatus::Error;
        }
    }

    /// Start a prediction for the current symbol.
    ///
    /// Clears the previous prediction and any previous prediction error. Fails only
    /// when no symbol has been selected yet.
    pub fn begin_prediction(&self) -> Result<PredictionGuard<'_>, ViewError> {
        let mut state = self.state.write();
        let symbol = state.symbol.clone().ok_or_else(|| {
            ViewError::invalid_request("Select a symbol before requesting a prediction")
        })?;

        state.prediction_token += 1;
        state.predicting = true;
        state.prediction = None;
        state.clear_error_of(ErrorKind::PredictionUnavailable);

        Ok(PredictionGuard {
            store: self,
            ticket: PredictionTicket {
                token: state.prediction_token,
                generation: state.generation,
                symbol,
            },
            armed: true,
        })
    }

    /// Apply a prediction result if it is the latest request and the history it
    /// was computed against is still current and loaded.
    pub fn complete_prediction(
        &self,
        ticket: &PredictionTicket,
        result: Result<Prediction, ViewError>,
    ) -> bool {
        let mut state = self.state.write();
        if state.prediction_token != ticket.token {
            debug!(
                token = ticket.token,
                current = state.prediction_token,
                "Discarding superseded prediction"
            );
            return false;
        }
        state.predicting = false;

        if state.generation != ticket.generation {
            debug!(
                symbol = %ticket.symbol,
                generation = ticket.generation,
                current = state.generation,
                "Discarding prediction for reloaded history"
            );
            return false;
        }

        match result {
            Ok(prediction) => {
                if state.status != SeriesStatus::Ready {
                    debug!(
                        symbol = %ticket.symbol,
                        status = ?state.status,
                        "Discarding prediction without loaded history"
                    );
                    return false;
                }
                state.prediction = Some(prediction);
                state.clear_error_of(ErrorKind::PredictionUnavailable);
            }
            Err(err) => {
                state.prediction = None;
                state.error = Some(err);
            }
        }
        true
    }

    fn abandon_prediction(&self, token: u64) {
        let mut state = self.state.write();
        if state.prediction_token == token {
            state.predicting = false;
        }
    }
}

impl Default for SeriesStore {
    fn default() -> Self {
        Self::new(Window::default())
    }
}

/// Scoped ownership of the `loading` state for one history generation.
///
/// Dropping the guard without calling [`HistoryGuard::finish`] (for example when the
/// request future is cancelled) moves the store out of `loading` so the flag can
/// never stay stuck.
pub struct HistoryGuard<'a> {
    store: &'a SeriesStore,
    generation: u64,
    armed: bool,
}

impl HistoryGuard<'_> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn finish(mut self, result: Result<HistorySnapshot, ViewError>) -> bool {
        self.armed = false;
        self.store.complete_history(self.generation, result)
    }
}

impl Drop for HistoryGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.store.abandon_history(self.generation);
        }
    }
}

/// Scoped ownership of the `predicting` flag for one prediction request
pub struct PredictionGuard<'a> {
    store: &'a SeriesStore,
    ticket: PredictionTicket,
    armed: bool,
}

impl PredictionGuard<'_> {
    pub fn ticket(&self) -> &PredictionTicket {
        &self.ticket
    }

    pub fn finish(mut self, result: Result<Prediction, ViewError>) -> bool {
        self.armed = false;
        self.store.complete_prediction(&self.ticket, result)
    }
}

impl Drop for PredictionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.store.abandon_prediction(self.ticket.token);
        }
    }
}
