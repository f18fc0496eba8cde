//! Unit tests for the fetch controller, driven by a scripted gateway

use crate::common::{create_test_records, date, snapshot_for, symbol, ScriptedGateway};
use std::sync::Arc;
use stockview::error::{ErrorKind, GatewayError};
use stockview::models::series::{Horizon, Prediction, Window};
use stockview::series::{FetchController, SeriesStatus};
use tokio_test::{assert_pending, assert_ready};

fn controller(gateway: &Arc<ScriptedGateway>) -> FetchController {
    FetchController::with_window(gateway.clone(), Window::ThreeMonths)
}

#[tokio::test]
async fn test_load_history_success() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);
    let tx = gateway.expect_history("AAPL", Window::ThreeMonths);
    tx.send(Ok(snapshot_for(create_test_records(90, date(2024, 1, 1)))))
        .unwrap();

    controller.set_symbol(" aapl").await.unwrap();

    let state = controller.current_state();
    assert_eq!(state.status, SeriesStatus::Ready);
    assert_eq!(state.records.len(), 90);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_invalid_inputs_do_not_touch_store() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);

    let err = controller.set_symbol("   ").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRequest);
    let err = controller.set_window(45).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRequest);
    let err = controller.refresh().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRequest);

    let state = controller.current_state();
    assert_eq!(state.status, SeriesStatus::Empty);
    assert_eq!(state.generation, 0);
}

#[tokio::test]
async fn test_set_window_before_symbol_only_records_window() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);

    controller.set_window(365).await.unwrap();

    let state = controller.current_state();
    assert_eq!(state.window, Window::OneYear);
    assert_eq!(state.status, SeriesStatus::Empty);
}

#[tokio::test]
async fn test_set_window_reloads_current_symbol() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);
    gateway
        .expect_history("AAPL", Window::ThreeMonths)
        .send(Ok(snapshot_for(create_test_records(90, date(2024, 1, 1)))))
        .unwrap();
    gateway
        .expect_history("AAPL", Window::OneMonth)
        .send(Ok(snapshot_for(create_test_records(30, date(2024, 3, 1)))))
        .unwrap();

    controller.set_symbol("AAPL").await.unwrap();
    controller.set_window(30).await.unwrap();

    let state = controller.current_state();
    assert_eq!(state.window, Window::OneMonth);
    assert_eq!(state.records.len(), 30);
    assert_eq!(state.generation, 2);
}

#[tokio::test]
async fn test_newer_request_wins_when_it_resolves_first() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);
    let aapl = gateway.expect_history("AAPL", Window::ThreeMonths);
    let msft = gateway.expect_history("MSFT", Window::OneMonth);

    tokio::join!(
        controller.load_history(symbol("AAPL"), Window::ThreeMonths),
        controller.load_history(symbol("MSFT"), Window::OneMonth),
        async {
            msft.send(Ok(snapshot_for(create_test_records(30, date(2024, 6, 1)))))
                .unwrap();
            tokio::task::yield_now().await;
            aapl.send(Ok(snapshot_for(create_test_records(90, date(2024, 1, 1)))))
                .unwrap();
        }
    );

    let state = controller.current_state();
    assert_eq!(state.symbol, Some(symbol("MSFT")));
    assert_eq!(state.window, Window::OneMonth);
    assert_eq!(state.records.len(), 30);
    assert_eq!(state.records[0].date, date(2024, 6, 1));
}

#[tokio::test]
async fn test_newer_request_wins_when_older_resolves_last() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);
    let aapl = gateway.expect_history("AAPL", Window::ThreeMonths);
    let msft = gateway.expect_history("MSFT", Window::OneMonth);

    tokio::join!(
        controller.load_history(symbol("AAPL"), Window::ThreeMonths),
        controller.load_history(symbol("MSFT"), Window::OneMonth),
        async {
            aapl.send(Ok(snapshot_for(create_test_records(90, date(2024, 1, 1)))))
                .unwrap();
            tokio::task::yield_now().await;
            msft.send(Ok(snapshot_for(create_test_records(30, date(2024, 6, 1)))))
                .unwrap();
        }
    );

    let state = controller.current_state();
    assert_eq!(state.status, SeriesStatus::Ready);
    assert_eq!(state.symbol, Some(symbol("MSFT")));
    assert_eq!(state.records.len(), 30);
}

#[tokio::test]
async fn test_stale_failure_does_not_clobber_newer_data() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);
    let aapl = gateway.expect_history("AAPL", Window::ThreeMonths);
    let msft = gateway.expect_history("MSFT", Window::ThreeMonths);

    tokio::join!(
        controller.load_history(symbol("AAPL"), Window::ThreeMonths),
        controller.load_history(symbol("MSFT"), Window::ThreeMonths),
        async {
            msft.send(Ok(snapshot_for(create_test_records(90, date(2024, 1, 1)))))
                .unwrap();
            tokio::task::yield_now().await;
            aapl.send(Err(GatewayError::Transport("reset".to_string())))
                .unwrap();
        }
    );

    let state = controller.current_state();
    assert_eq!(state.status, SeriesStatus::Ready);
    assert!(state.error.is_none());
}

#[tokio::test]
async fn test_reload_passes_through_loading_and_clears_prediction() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);
    gateway
        .expect_history("AAPL", Window::ThreeMonths)
        .send(Ok(snapshot_for(create_test_records(90, date(2024, 1, 1)))))
        .unwrap();
    gateway
        .expect_prediction()
        .send(Ok(Prediction::new(180.5, Horizon::Day)))
        .unwrap();
    controller.set_symbol("AAPL").await.unwrap();
    controller.request_prediction(Horizon::Day).await.unwrap();
    assert!(controller.current_state().prediction.is_some());

    let reload = gateway.expect_history("AAPL", Window::ThreeMonths);
    tokio::join!(controller.refresh(), async {
        let during = controller.current_state();
        assert_eq!(during.status, SeriesStatus::Loading);
        assert!(during.loading);
        assert!(during.prediction.is_none());
        assert!(during.error.is_none());
        reload
            .send(Ok(snapshot_for(create_test_records(90, date(2024, 1, 2)))))
            .unwrap();
    })
    .0
    .unwrap();

    let state = controller.current_state();
    assert_eq!(state.status, SeriesStatus::Ready);
    assert!(state.prediction.is_none());
}

#[tokio::test]
async fn test_prediction_is_merged_into_series() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);
    gateway
        .expect_history("AAPL", Window::ThreeMonths)
        .send(Ok(snapshot_for(create_test_records(90, date(2024, 1, 1)))))
        .unwrap();
    gateway
        .expect_prediction()
        .send(Ok(Prediction::new(180.5, Horizon::Day)))
        .unwrap();

    controller.set_symbol("AAPL").await.unwrap();
    controller.request_prediction(Horizon::Day).await.unwrap();

    let candles = controller.as_candlestick();
    assert_eq!(candles.len(), 91);
    let tail = candles.last().unwrap();
    assert!(tail.predicted);
    assert_eq!(tail.close, 180.5);

    let line = controller.as_line_series();
    assert_eq!(line.len(), 91);
    assert!(line.last().unwrap().predicted);
    assert_eq!(controller.current_state().records.len(), 90);
}

#[tokio::test]
async fn test_prediction_failure_is_recorded_without_touching_history() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);
    gateway
        .expect_history("AAPL", Window::ThreeMonths)
        .send(Ok(snapshot_for(create_test_records(90, date(2024, 1, 1)))))
        .unwrap();
    gateway
        .expect_prediction()
        .send(Err(GatewayError::Status {
            status: 500,
            message: "Prediction failed".to_string(),
        }))
        .unwrap();

    controller.set_symbol("AAPL").await.unwrap();
    controller.request_prediction(Horizon::Month).await.unwrap();

    let state = controller.current_state();
    assert_eq!(state.status, SeriesStatus::Ready);
    assert_eq!(state.records.len(), 90);
    assert!(state.prediction.is_none());
    assert!(!state.predicting);
    assert_eq!(state.error.unwrap().kind, ErrorKind::PredictionUnavailable);
}

#[tokio::test]
async fn test_prediction_without_symbol_is_rejected() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);

    let err = controller.request_prediction(Horizon::Day).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidRequest);
    assert!(!controller.current_state().predicting);
}

#[test]
fn test_cancelled_history_request_clears_loading() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);
    let _pending = gateway.expect_history("AAPL", Window::ThreeMonths);

    let mut task =
        tokio_test::task::spawn(controller.load_history(symbol("AAPL"), Window::ThreeMonths));
    assert_pending!(task.poll());
    assert!(controller.current_state().loading);

    drop(task);

    let state = controller.current_state();
    assert!(!state.loading);
    assert_eq!(state.status, SeriesStatus::Error);
    assert_eq!(state.error.unwrap().kind, ErrorKind::NetworkFailure);
}

#[test]
fn test_pending_prediction_sets_predicting_flag() {
    let gateway = Arc::new(ScriptedGateway::default());
    let controller = controller(&gateway);
    gateway
        .expect_history("AAPL", Window::ThreeMonths)
        .send(Ok(snapshot_for(create_test_records(90, date(2024, 1, 1)))))
        .unwrap();
    let mut load =
        tokio_test::task::spawn(controller.load_history(symbol("AAPL"), Window::ThreeMonths));
    assert_ready!(load.poll());

    let reply = gateway.expect_prediction();
    let mut predict = tokio_test::task::spawn(controller.request_prediction(Horizon::Day));
    assert_pending!(predict.poll());
    assert!(controller.current_state().predicting);

    reply.send(Ok(Prediction::new(150.0, Horizon::Day))).unwrap();
    assert!(predict.is_woken());
    assert_ready!(predict.poll()).unwrap();

    let state = controller.current_state();
    assert!(!state.predicting);
    assert_eq!(state.prediction.unwrap().predicted_close, 150.0);
}
