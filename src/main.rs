use chrono::Local;
use energy_dashboard::repositories::{BackendClient, FileStore, StateStore, WeatherProvider};
use energy_dashboard::services::{
    ApplianceStateService, ForecastService, OptimizerService, WeatherService,
};
use energy_dashboard::Config;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let cfg = Config::from_env()?;
    info!(
        backend = %cfg.backend.url,
        latitude = cfg.weather.latitude,
        longitude = cfg.weather.longitude,
        "configuration loaded"
    );

    let store = StateStore::new(Arc::new(FileStore::open(&cfg.storage.state_file)));
    let provider = WeatherProvider::new(
        cfg.weather.url.clone(),
        cfg.weather.latitude,
        cfg.weather.longitude,
    );
    let backend = BackendClient::new(cfg.backend.url.clone());

    let weather = WeatherService::new(provider, store.clone());
    let mut forecast = ForecastService::new(backend.clone(), store.clone());
    let mut optimizer = OptimizerService::new(backend.clone());
    let mut appliances = ApplianceStateService::load(store.clone());
    info!(
        total = appliances.total_consumption(),
        "appliance state loaded"
    );

    // First tick fires immediately, covering the refresh-on-start case.
    let mut tick =
        tokio::time::interval(Duration::from_secs(cfg.weather.refresh_minutes * 60));
    let mut first_refresh_done = false;

    let sig = tokio::signal::ctrl_c();
    tokio::pin!(sig);
    loop {
        tokio::select! {
            biased;
            _ = &mut sig => {
                info!("shutdown requested");
                break;
            }
            _ = tick.tick() => {
                match weather.refresh().await {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(e) => {
                        warn!(error = %e, "weather refresh failed");
                        continue;
                    }
                }

                if let Some(snapshot) = weather.current_snapshot() {
                    info!(
                        temperature = snapshot.temperature,
                        humidity = snapshot.humidity,
                        wind = snapshot.wind,
                        "current conditions"
                    );
                }

                match forecast.refresh(&weather, Local::now()).await {
                    Ok(series) => {
                        let peak = series
                            .with_load
                            .iter()
                            .cloned()
                            .fold(f64::MIN, f64::max);
                        info!(peak, "forecast refreshed");
                    }
                    Err(e) => warn!(error = %e, "forecast refresh failed"),
                }

                if cfg.backend.optimize_on_start && !first_refresh_done {
                    run_optimizer_once(
                        &mut optimizer,
                        &mut appliances,
                        &weather,
                        &backend,
                        cfg.backend.user_email.as_deref(),
                    )
                    .await;
                }
                first_refresh_done = true;
            }
        }
    }

    Ok(())
}

/// One optimize-reconcile-commit cycle against the freshly stored weather.
async fn run_optimizer_once(
    optimizer: &mut OptimizerService,
    appliances: &mut ApplianceStateService,
    weather: &WeatherService,
    backend: &BackendClient,
    user_email: Option<&str>,
) {
    let request = match OptimizerService::build_request(
        Local::now(),
        weather.current_snapshot(),
        appliances.state(),
    ) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "cannot build optimizer request");
            return;
        }
    };

    match optimizer.run(request, appliances.state_mut()).await {
        Ok(outcome) => {
            info!(summary = %outcome.summary, "optimizer suggestions applied");
            if optimizer.can_apply() {
                appliances.commit_and_sync(backend, user_email).await;
            }
        }
        Err(e) => warn!(error = %e, "optimizer run failed"),
    }
}
