//! Stockview viewer server
//!
//! Serves the series pipeline over HTTP for a chart-rendering client and
//! forwards data/prediction requests to the remote stock service.

use dotenvy::dotenv;
use stockview::config::ViewerConfig;
use stockview::core::http::start_server;
use stockview::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = ViewerConfig::from_env();
    info!("Starting Stockview viewer server");
    info!(environment = %config.environment, "Environment");
    info!(gateway = %config.gateway_url, timeout = ?config.gateway_timeout, "Remote data service");
    info!(port = config.port, "HTTP Server: http://0.0.0.0:{}", config.port);

    tokio::select! {
        result = start_server(config) => {
            if let Err(e) = result {
                error!(error = %e, "HTTP server error");
                return Err(e);
            }
            error!("HTTP server stopped");
        }
        _ = signal::ctrl_c() => {
            info!("Shutting down viewer server...");
        }
    }

    Ok(())
}
