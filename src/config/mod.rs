//! Environment-driven configuration for the viewer

use crate::models::series::{Horizon, Symbol, Window};
use std::env;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_GATEWAY_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_SYMBOL: &str = "AAPL";

/// Deployment environment (`APP_ENV`), `sandbox` when unset
pub fn get_environment() -> String {
    env::var("APP_ENV").unwrap_or_else(|_| "sandbox".to_string())
}

/// Base URL of the remote data/prediction service
pub fn get_gateway_url() -> String {
    env::var("GATEWAY_URL").unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string())
}

/// Optional per-request timeout for gateway calls.
///
/// `0` or unset means no timeout: a hung request stays in flight until the
/// service answers.
pub fn get_gateway_timeout() -> Option<Duration> {
    env::var("GATEWAY_TIMEOUT_SECONDS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
}

pub fn get_port() -> u16 {
    env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

/// Settings shared by the viewer binaries
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub environment: String,
    pub gateway_url: String,
    pub gateway_timeout: Option<Duration>,
    pub port: u16,
    pub default_symbol: Symbol,
    pub default_window: Window,
    pub default_horizon: Horizon,
}

impl ViewerConfig {
    /// Read the configuration from the process environment.
    ///
    /// Invalid symbol/window/horizon values are logged and replaced by defaults.
    pub fn from_env() -> Self {
        let default_symbol = match env::var("DEFAULT_SYMBOL") {
            Ok(raw) => Symbol::parse(&raw).unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Ignoring invalid DEFAULT_SYMBOL");
                fallback_symbol()
            }),
            Err(_) => fallback_symbol(),
        };

        let default_window = match env::var("DEFAULT_WINDOW") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .and_then(|days| Window::from_days(days).ok())
                .unwrap_or_else(|| {
                    warn!(value = %raw, "Ignoring invalid DEFAULT_WINDOW");
                    Window::default()
                }),
            Err(_) => Window::default(),
        };

        let default_horizon = match env::var("DEFAULT_HORIZON") {
            Ok(raw) => raw.parse::<Horizon>().unwrap_or_else(|e| {
                warn!(value = %raw, error = %e, "Ignoring invalid DEFAULT_HORIZON");
                Horizon::default()
            }),
            Err(_) => Horizon::default(),
        };

        Self {
            environment: get_environment(),
            gateway_url: get_gateway_url(),
            gateway_timeout: get_gateway_timeout(),
            port: get_port(),
            default_symbol,
            default_window,
            default_horizon,
        }
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            environment: "sandbox".to_string(),
            gateway_url: DEFAULT_GATEWAY_URL.to_string(),
            gateway_timeout: None,
            port: DEFAULT_PORT,
            default_symbol: fallback_symbol(),
            default_window: Window::default(),
            default_horizon: Horizon::default(),
        }
    }
}

fn fallback_symbol() -> Symbol {
    Symbol::new_unchecked(DEFAULT_SYMBOL)
}
