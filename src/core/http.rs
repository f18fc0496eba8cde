//! HTTP endpoint server using Axum
//!
//! Exposes the series pipeline to a rendering client: commands mutate the
//! store through the fetch controller, reads return snapshots and projections.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{info, Level};

use crate::config::ViewerConfig;
use crate::error::{ErrorKind, ViewError};
use crate::models::series::{Horizon, Window};
use crate::series::{ChartKind, FetchController, ProjectedSeries, SeriesSnapshot};
use crate::services::gateway::HttpMarketDataGateway;

#[derive(Clone)]
pub struct AppState {
    pub start_time: Arc<Instant>,
    pub controller: FetchController,
    pub default_horizon: Horizon,
}

impl AppState {
    pub fn new(controller: FetchController, default_horizon: Horizon) -> Self {
        Self {
            start_time: Arc::new(Instant::now()),
            controller,
            default_horizon,
        }
    }
}

/// `degraded` while the last history load failed on the remote side
pub fn health_status(snapshot: &SeriesSnapshot) -> &'static str {
    match snapshot.error.as_ref().map(|e| e.kind) {
        Some(ErrorKind::NetworkFailure | ErrorKind::ServiceFailure) => "degraded",
        _ => "healthy",
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: ErrorKind,
    message: String,
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        let status = match self.kind {
            ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ServiceFailure | ErrorKind::PredictionUnavailable => StatusCode::BAD_GATEWAY,
            ErrorKind::NetworkFailure => StatusCode::GATEWAY_TIMEOUT,
        };
        let body = ErrorBody {
            code: self.kind,
            message: self.message,
        };
        (status, Json(body)).into_response()
    }
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let snapshot = state.controller.current_state();
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health_status(&snapshot),
        "series_status": snapshot.status,
        "uptime_seconds": uptime_seconds,
        "service": "stockview-viewer"
    })))
}

/// Selectable windows, horizons and chart kinds with their display labels
async fn list_options(State(state): State<AppState>) -> Json<Value> {
    let windows: Vec<Value> = Window::ALL
        .iter()
        .map(|w| json!({ "days": w.days(), "label": w.label() }))
        .collect();
    let horizons: Vec<Value> = Horizon::ALL
        .iter()
        .map(|h| json!({ "value": h.as_str(), "label": h.label() }))
        .collect();
    let charts: Vec<Value> = [ChartKind::Candlestick, ChartKind::Line]
        .iter()
        .map(|k| json!({ "value": k, "title": k.title() }))
        .collect();

    Json(json!({
        "windows": windows,
        "horizons": horizons,
        "charts": charts,
        "default_horizon": state.default_horizon.as_str(),
    }))
}

async fn get_series(State(state): State<AppState>) -> Json<SeriesSnapshot> {
    Json(state.controller.current_state())
}

#[derive(Debug, Deserialize)]
struct SymbolRequest {
    symbol: String,
}

async fn set_symbol(
    State(state): State<AppState>,
    Json(request): Json<SymbolRequest>,
) -> Result<Json<SeriesSnapshot>, ViewError> {
    state.controller.set_symbol(&request.symbol).await?;
    Ok(Json(state.controller.current_state()))
}

#[derive(Debug, Deserialize)]
struct WindowRequest {
    days: u32,
}

async fn set_window(
    State(state): State<AppState>,
    Json(request): Json<WindowRequest>,
) -> Result<Json<SeriesSnapshot>, ViewError> {
    state.controller.set_window(request.days).await?;
    Ok(Json(state.controller.current_state()))
}

async fn refresh(State(state): State<AppState>) -> Result<Json<SeriesSnapshot>, ViewError> {
    state.controller.refresh().await?;
    Ok(Json(state.controller.current_state()))
}

#[derive(Debug, Deserialize)]
struct PredictRequest {
    #[serde(default)]
    horizon: Option<String>,
}

async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<SeriesSnapshot>, ViewError> {
    let horizon = match request.horizon {
        Some(raw) => raw.parse::<Horizon>()?,
        None => state.default_horizon,
    };
    state.controller.request_prediction(horizon).await?;
    Ok(Json(state.controller.current_state()))
}

async fn candlestick(State(state): State<AppState>) -> Json<ProjectedSeries> {
    Json(state.controller.render(ChartKind::Candlestick))
}

async fn line(State(state): State<AppState>) -> Json<ProjectedSeries> {
    Json(state.controller.render(ChartKind::Line))
}

#[derive(Debug, Deserialize)]
struct ChartQuery {
    kind: Option<String>,
}

async fn chart(
    State(state): State<AppState>,
    Query(params): Query<ChartQuery>,
) -> Result<Json<ProjectedSeries>, ViewError> {
    let kind = match params.kind {
        Some(raw) => raw.parse::<ChartKind>()?,
        None => ChartKind::default(),
    };
    Ok(Json(state.controller.render(kind)))
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/options", get(list_options))
        .route("/api/series", get(get_series))
        .route("/api/series/symbol", put(set_symbol))
        .route("/api/series/window", put(set_window))
        .route("/api/series/refresh", post(refresh))
        .route("/api/series/predict", post(predict))
        .route("/api/series/candlestick", get(candlestick))
        .route("/api/series/line", get(line))
        .route("/api/series/chart", get(chart))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn start_server(config: ViewerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let gateway = HttpMarketDataGateway::new(config.gateway_url.clone(), config.gateway_timeout)?;
    let controller = FetchController::with_window(Arc::new(gateway), config.default_window);

    info!(
        symbol = %config.default_symbol,
        window = config.default_window.days(),
        "Loading initial series"
    );
    controller
        .load_history(config.default_symbol.clone(), config.default_window)
        .await;

    let state = AppState::new(controller, config.default_horizon);
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    info!(port = config.port, "HTTP server listening on port {}", config.port);
    axum::serve(listener, app).await?;

    Ok(())
}
