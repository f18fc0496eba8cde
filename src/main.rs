use dotenvy::dotenv;
use std::env;
use std::sync::Arc;
use stockview::config::ViewerConfig;
use stockview::logging;
use stockview::models::series::Statistics;
use stockview::series::{
    ChartKind, FetchController, ProjectedSeries, SeriesSnapshot, SeriesStatus,
};
use stockview::services::gateway::HttpMarketDataGateway;

/// One-shot fetch: loads DEFAULT_SYMBOL/DEFAULT_WINDOW, optionally predicts
/// (PREDICT=1) and prints the statistics and the CHART projection.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    let config = ViewerConfig::from_env();
    let predict = env::var("PREDICT")
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    let chart: ChartKind = match env::var("CHART") {
        Ok(raw) => raw.parse()?,
        Err(_) => ChartKind::default(),
    };

    let gateway = HttpMarketDataGateway::new(config.gateway_url.clone(), config.gateway_timeout)?;
    let controller = FetchController::with_window(Arc::new(gateway), config.default_window);

    controller
        .load_history(config.default_symbol.clone(), config.default_window)
        .await;

    if predict && controller.store().status() == SeriesStatus::Ready {
        controller.request_prediction(config.default_horizon).await?;
    }

    let snapshot = controller.current_state();
    print_snapshot(&snapshot);
    println!();
    print_series(&controller.render(chart));

    Ok(())
}

fn print_snapshot(snapshot: &SeriesSnapshot) {
    let symbol = snapshot
        .symbol
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_default();
    println!("{} Stock Data ({})", symbol, snapshot.window.label());
    println!("  Status: {:?}", snapshot.status);
    println!("  Records: {}", snapshot.records.len());

    if let Some(error) = &snapshot.error {
        println!("  Error [{}]: {}", error.kind, error.message);
    }
    if let Some(stats) = &snapshot.statistics {
        print_statistics(stats);
    }
    if let Some(prediction) = &snapshot.prediction {
        println!(
            "  Prediction ({}): ${:.2}",
            prediction.horizon.label(),
            prediction.predicted_close
        );
    }
}

fn print_statistics(stats: &Statistics) {
    if let Some(price) = &stats.price_stats {
        println!("  Current: ${}", price.current);
        println!("  Highest: ${}", price.highest);
        println!("  Lowest: ${}", price.lowest);
        println!("  Avg Close: ${}", price.average);
        println!("  Change: {} ({}%)", price.change, price.change_percent);
    }
    if let Some(volume) = &stats.volume_stats {
        println!("  Volume Avg: {}", volume.average);
    }
    if let Some(perf) = &stats.performance_stats {
        println!("  Positive Days: {}", perf.positive_days);
        println!("  Negative Days: {}", perf.negative_days);
    }
}

fn print_series(series: &ProjectedSeries) {
    match series {
        ProjectedSeries::Candlestick(points) => {
            println!("{}", ChartKind::Candlestick.title());
            for p in points {
                let marker = if p.predicted { " *predicted*" } else { "" };
                println!(
                    "  {}  O:{}  H:{}  L:{}  C:{:.2}{}",
                    p.date,
                    fmt_price(p.open),
                    fmt_price(p.high),
                    fmt_price(p.low),
                    p.close,
                    marker
                );
            }
        }
        ProjectedSeries::Line(points) => {
            println!("{}", ChartKind::Line.title());
            for p in points {
                let marker = if p.predicted { " *predicted*" } else { "" };
                println!("  {}  {:.2}{}", p.date, p.close, marker);
            }
        }
    }
}

fn fmt_price(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}
