// End-to-end scenarios for the dashboard pipeline: stub HTTP collaborators
// (weather provider, optimizer, predictor) served with axum on ephemeral
// ports, persistence through an in-memory store.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Local, TimeZone};
use energy_dashboard::models::{ApplianceId, HOURS_PER_DAY};
use energy_dashboard::repositories::store::{
    KEY_HOURLY_HUMIDITY, KEY_HOURLY_TEMP, KEY_HOURLY_WIND, KEY_TOTAL,
};
use energy_dashboard::repositories::{
    BackendClient, MemoryStore, StateStore, WeatherProvider,
};
use energy_dashboard::services::{
    ApplianceStateService, ForecastService, OptimizerPhase, OptimizerService, WeatherService,
};
use energy_dashboard::AppError;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

fn memory_store() -> StateStore {
    StateStore::new(Arc::new(MemoryStore::new()))
}

fn seed_weather(store: &StateStore) {
    let temperature: Vec<f64> = (0..24).map(|i| 25.0 + i as f64 * 0.5).collect();
    store.set_json_array(KEY_HOURLY_TEMP, Some(&temperature));
    store.set_json_array(KEY_HOURLY_HUMIDITY, Some(&vec![60.0; 24]));
    store.set_json_array(KEY_HOURLY_WIND, Some(&vec![14.4; 24]));
}

#[derive(Clone, Default)]
struct CapturedRequests(Arc<Mutex<Vec<Value>>>);

// --- optimizer scenarios -------------------------------------------------

async fn optimize_with_suggestions(
    State(captured): State<CapturedRequests>,
    Json(body): Json<Value>,
) -> Json<Value> {
    captured.0.lock().unwrap().push(body);
    Json(json!({ "suggestions": ["Turn ON Fan", "Turn OFF AC"] }))
}

#[tokio::test]
async fn optimizer_run_reconciles_suggestions_into_state() {
    let captured = CapturedRequests::default();
    let router = Router::new()
        .route("/optimize", post(optimize_with_suggestions))
        .with_state(captured.clone());
    let base_url = spawn_stub(router).await;

    let store = memory_store();
    store.set_bool_flag("TV", 1);
    store.set_bool_flag("AC", 1);
    seed_weather(&store);

    let mut appliances = ApplianceStateService::load(store.clone());
    let weather = WeatherService::new(
        WeatherProvider::new("http://127.0.0.1:9", 0.0, 0.0),
        store.clone(),
    );
    let mut optimizer = OptimizerService::new(BackendClient::new(base_url));

    let now = Local.with_ymd_and_hms(2025, 3, 9, 21, 5, 0).unwrap();
    let request = OptimizerService::build_request(
        now,
        weather.current_snapshot(),
        appliances.state(),
    )
    .unwrap();
    let outcome = optimizer.run(request, appliances.state_mut()).await.unwrap();

    // Fan turned on, AC turned off, everything else untouched.
    assert!(appliances.state().is_on(ApplianceId::Fan));
    assert!(!appliances.state().is_on(ApplianceId::Ac));
    assert!(appliances.state().is_on(ApplianceId::Tv));
    assert!(!appliances.state().is_on(ApplianceId::Fridge));

    // Total recomputed from the reconciled state: TV + Fan.
    assert!((outcome.total_consumption - 0.4).abs() < 1e-9);
    assert_eq!(
        outcome.summary,
        "You can turn on the Fan. Make sure to turn off the AC."
    );
    assert_eq!(optimizer.phase(), OptimizerPhase::SuggestionsApplied);
    assert!(optimizer.can_apply());

    // The backend saw the real calendar time and the pre-run states.
    let requests = captured.0.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["Day"], 9);
    assert_eq!(requests[0]["Month"], 3);
    assert_eq!(requests[0]["Hour"], 21);
    assert_eq!(requests[0]["Temperature"], 25.0);
    assert_eq!(requests[0]["current_states"]["TV"], 1);
    assert_eq!(requests[0]["current_states"]["AC"], 1);
    assert_eq!(requests[0]["current_states"]["Fan"], 0);
}

async fn optimize_empty(Json(_body): Json<Value>) -> Json<Value> {
    Json(json!({
        "suggestions": [],
        "message": "All appliances are in their predicted states."
    }))
}

#[tokio::test]
async fn optimizer_with_no_suggestions_reports_no_changes_and_disables_apply() {
    let router = Router::new().route("/optimize", post(optimize_empty));
    let base_url = spawn_stub(router).await;

    let store = memory_store();
    seed_weather(&store);

    let mut appliances = ApplianceStateService::load(store.clone());
    let weather = WeatherService::new(
        WeatherProvider::new("http://127.0.0.1:9", 0.0, 0.0),
        store.clone(),
    );
    let mut optimizer = OptimizerService::new(BackendClient::new(base_url));

    let request = OptimizerService::build_request(
        Local::now(),
        weather.current_snapshot(),
        appliances.state(),
    )
    .unwrap();
    let outcome = optimizer.run(request, appliances.state_mut()).await.unwrap();

    assert_eq!(outcome.summary, "No changes needed. You're good to go!");
    assert!(outcome.directives.is_empty());
    assert_eq!(optimizer.phase(), OptimizerPhase::Idle);
    assert!(!optimizer.can_apply());
    assert_eq!(appliances.total_consumption(), 0.0);
}

#[tokio::test]
async fn optimizer_backend_failure_leaves_state_untouched() {
    let router = Router::new().route(
        "/optimize",
        post(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let base_url = spawn_stub(router).await;

    let store = memory_store();
    store.set_bool_flag("Oven", 1);
    seed_weather(&store);

    let mut appliances = ApplianceStateService::load(store.clone());
    let weather = WeatherService::new(
        WeatherProvider::new("http://127.0.0.1:9", 0.0, 0.0),
        store.clone(),
    );
    let mut optimizer = OptimizerService::new(BackendClient::new(base_url));

    let request = OptimizerService::build_request(
        Local::now(),
        weather.current_snapshot(),
        appliances.state(),
    )
    .unwrap();
    let err = optimizer
        .run(request, appliances.state_mut())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::OptimizationFailed(_)));
    assert_eq!(optimizer.phase(), OptimizerPhase::Failed);
    assert!(!optimizer.can_apply());
    assert!(appliances.state().is_on(ApplianceId::Oven));
    assert!((appliances.total_consumption() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn build_request_fails_before_any_network_call_when_weather_is_absent() {
    let store = memory_store();
    let appliances = ApplianceStateService::load(store.clone());
    let weather = WeatherService::new(
        WeatherProvider::new("http://127.0.0.1:9", 0.0, 0.0),
        store,
    );

    let err = OptimizerService::build_request(
        Local::now(),
        weather.current_snapshot(),
        appliances.state(),
    )
    .unwrap_err();
    assert!(matches!(err, AppError::InvalidWeatherData(_)));
}

// --- forecast scenarios --------------------------------------------------

async fn predict_then_truncate(State(calls): State<Arc<AtomicUsize>>) -> Json<Value> {
    let call = calls.fetch_add(1, Ordering::SeqCst);
    let predictions: Vec<f64> = if call == 0 {
        (0..HOURS_PER_DAY).map(|i| i as f64 * 0.1).collect()
    } else {
        vec![0.0; 10]
    };
    Json(json!({ "status": "success", "predictions": predictions }))
}

#[tokio::test]
async fn wrong_length_predictions_leave_the_previous_baseline_in_place() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route("/predict_energy_consumption", post(predict_then_truncate))
        .with_state(calls);
    let base_url = spawn_stub(router).await;

    let store = memory_store();
    store.set_number(KEY_TOTAL, 1.5);
    seed_weather(&store);

    let weather = WeatherService::new(
        WeatherProvider::new("http://127.0.0.1:9", 0.0, 0.0),
        store.clone(),
    );
    let mut forecast = ForecastService::new(BackendClient::new(base_url), store);

    let now = Local.with_ymd_and_hms(2025, 3, 9, 4, 0, 0).unwrap();
    forecast.refresh(&weather, now).await.unwrap();
    let first = forecast.current().clone();
    assert!((first.baseline[10] - 1.0).abs() < 1e-9);
    assert!((first.with_load[10] - 2.5).abs() < 1e-9);

    let err = forecast.refresh(&weather, now).await.unwrap_err();
    assert!(matches!(err, AppError::ForecastUnavailable(_)));
    assert_eq!(forecast.current(), &first);
}

#[tokio::test]
async fn missing_weather_with_a_saved_total_yields_a_flat_curve() {
    let store = memory_store();
    store.set_number(KEY_TOTAL, 2.2);

    let weather = WeatherService::new(
        WeatherProvider::new("http://127.0.0.1:9", 0.0, 0.0),
        store.clone(),
    );
    let mut forecast = ForecastService::new(BackendClient::new("http://127.0.0.1:9"), store);

    let series = forecast.refresh(&weather, Local::now()).await.unwrap();
    assert_eq!(series.with_load, vec![2.2; HOURS_PER_DAY]);
    assert_eq!(series.baseline, vec![0.0; HOURS_PER_DAY]);
}

#[tokio::test]
async fn missing_weather_and_no_total_changes_nothing() {
    let store = memory_store();
    let weather = WeatherService::new(
        WeatherProvider::new("http://127.0.0.1:9", 0.0, 0.0),
        store.clone(),
    );
    let mut forecast = ForecastService::new(BackendClient::new("http://127.0.0.1:9"), store);

    let series = forecast.refresh(&weather, Local::now()).await.unwrap();
    assert_eq!(series.baseline, vec![0.0; HOURS_PER_DAY]);
    assert_eq!(series.with_load, vec![0.0; HOURS_PER_DAY]);
}

// --- weather refresh -----------------------------------------------------

async fn weather_ok() -> Json<Value> {
    let temperature: Vec<f64> = (0..24).map(|i| 20.0 + i as f64).collect();
    let humidity: Vec<f64> = vec![55.0; 24];
    let wind_ms: Vec<f64> = vec![10.0; 24];
    Json(json!({
        "hourly": {
            "temperature_2m": temperature,
            "relative_humidity_2m": humidity,
            "wind_speed_10m": wind_ms,
        }
    }))
}

#[tokio::test]
async fn weather_refresh_converts_wind_and_persists_the_series() {
    let router = Router::new().route("/", get(weather_ok));
    let base_url = spawn_stub(router).await;

    let store = memory_store();
    let weather = WeatherService::new(
        WeatherProvider::new(format!("{}/", base_url), 24.86, 67.0),
        store.clone(),
    );

    assert!(weather.refresh().await.unwrap());

    let stored = weather.stored_series().unwrap();
    assert_eq!(stored.temperature[0], 20.0);
    // 10 m/s -> 36.0 km/h, converted before persisting.
    assert_eq!(stored.wind, vec![36.0; 24]);

    let snapshot = weather.current_snapshot().unwrap();
    assert_eq!(snapshot.wind, 36.0);
}

#[tokio::test]
async fn failed_weather_refresh_marks_the_series_absent() {
    let router = Router::new().route(
        "/",
        get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "down") }),
    );
    let base_url = spawn_stub(router).await;

    let store = memory_store();
    seed_weather(&store);
    let weather = WeatherService::new(
        WeatherProvider::new(format!("{}/", base_url), 24.86, 67.0),
        store.clone(),
    );
    assert!(weather.current_snapshot().is_some());

    assert!(weather.refresh().await.is_err());
    // The stale series must not survive a failed refresh.
    assert!(weather.stored_series().is_none());
    assert!(weather.current_snapshot().is_none());
}

async fn weather_slow_then_fast(State(calls): State<Arc<AtomicUsize>>) -> Json<Value> {
    let call = calls.fetch_add(1, Ordering::SeqCst);
    let marker = if call == 0 {
        tokio::time::sleep(Duration::from_millis(400)).await;
        1.0
    } else {
        2.0
    };
    Json(json!({
        "hourly": {
            "temperature_2m": vec![marker; 24],
            "relative_humidity_2m": vec![50.0; 24],
            "wind_speed_10m": vec![5.0; 24],
        }
    }))
}

#[tokio::test]
async fn a_superseded_refresh_response_is_discarded() {
    let calls = Arc::new(AtomicUsize::new(0));
    let router = Router::new()
        .route("/", get(weather_slow_then_fast))
        .with_state(calls);
    let base_url = spawn_stub(router).await;

    let store = memory_store();
    let weather = Arc::new(WeatherService::new(
        WeatherProvider::new(format!("{}/", base_url), 24.86, 67.0),
        store.clone(),
    ));

    // The first refresh is still in flight when the second one is issued;
    // its late response must not overwrite the newer data.
    let slow = tokio::spawn({
        let weather = weather.clone();
        async move { weather.refresh().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = weather.refresh().await;
    let first = slow.await.unwrap();

    assert!(matches!(first, Ok(false)));
    assert!(second.unwrap());

    let snapshot = weather.current_snapshot().unwrap();
    assert_eq!(snapshot.temperature, 2.0);
}

// --- commit and backend sync ---------------------------------------------

async fn capture_update(
    State(captured): State<CapturedRequests>,
    Json(body): Json<Value>,
) -> Json<Value> {
    captured.0.lock().unwrap().push(body);
    Json(json!({ "message": "Appliance states updated successfully!" }))
}

#[tokio::test]
async fn commit_and_sync_mirrors_the_committed_state() {
    let captured = CapturedRequests::default();
    let router = Router::new()
        .route("/update", post(capture_update))
        .with_state(captured.clone());
    let base_url = spawn_stub(router).await;

    let store = memory_store();
    let mut appliances = ApplianceStateService::load(store.clone());
    appliances.toggle(ApplianceId::Tv);
    appliances.toggle(ApplianceId::Fan);

    let backend = BackendClient::new(base_url);
    let total = appliances
        .commit_and_sync(&backend, Some("user@example.com"))
        .await;

    assert!((total - 0.4).abs() < 1e-9);
    assert_eq!(store.get_bool_flag("TV"), 1);
    assert_eq!(store.get_bool_flag("Fan"), 1);
    assert_eq!(store.get_number(KEY_TOTAL), Some(total));

    let requests = captured.0.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["email"], "user@example.com");
    assert_eq!(requests[0]["appliances"], json!([1, 0, 0, 0, 1, 0]));
}

#[tokio::test]
async fn failed_sync_keeps_the_local_commit() {
    let store = memory_store();
    let mut appliances = ApplianceStateService::load(store.clone());
    appliances.toggle(ApplianceId::Light);

    // Nothing is listening here; the sync fails but the commit stands.
    let backend = BackendClient::new("http://127.0.0.1:9");
    let total = appliances
        .commit_and_sync(&backend, Some("user@example.com"))
        .await;

    assert!((total - 0.2).abs() < 1e-9);
    assert_eq!(store.get_bool_flag("Light"), 1);
    assert_eq!(store.get_number(KEY_TOTAL), Some(total));
}
