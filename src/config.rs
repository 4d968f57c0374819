use crate::error::{AppError, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub weather: WeatherConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    pub url: String,
    /// When set, commits are mirrored to the backend for this user.
    pub user_email: Option<String>,
    /// Run one optimize-and-commit cycle after the first weather refresh.
    pub optimize_on_start: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherConfig {
    pub url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub refresh_minutes: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub state_file: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let url =
            env::var("BACKEND_URL").unwrap_or_else(|_| "http://localhost:9000".to_string());
        let user_email = env::var("USER_EMAIL").ok().filter(|s| !s.is_empty());
        let optimize_on_start = matches!(
            env::var("OPTIMIZE_ON_START").as_deref(),
            Ok("1") | Ok("true")
        );

        let weather_url = env::var("WEATHER_URL")
            .unwrap_or_else(|_| "https://api.open-meteo.com/v1/forecast".to_string());

        let latitude = parse_env_f64("LATITUDE", 24.8607)?;
        let longitude = parse_env_f64("LONGITUDE", 67.0011)?;

        let refresh_minutes: u64 = match env::var("WEATHER_REFRESH_MINUTES") {
            Ok(raw) => raw.parse().map_err(|_| {
                AppError::Config(format!("WEATHER_REFRESH_MINUTES is not a number: {}", raw))
            })?,
            Err(_) => 15,
        };
        if refresh_minutes == 0 {
            return Err(AppError::Config(
                "WEATHER_REFRESH_MINUTES must be at least 1".to_string(),
            ));
        }

        let state_file =
            env::var("STATE_FILE").unwrap_or_else(|_| "dashboard-state.json".to_string());

        Ok(Config {
            backend: BackendConfig {
                url,
                user_email,
                optimize_on_start,
            },
            weather: WeatherConfig {
                url: weather_url,
                latitude,
                longitude,
                refresh_minutes,
            },
            storage: StorageConfig { state_file },
        })
    }
}

fn parse_env_f64(name: &str, default: f64) -> Result<f64> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::Config(format!("{} is not a number: {}", name, raw))),
        Err(_) => Ok(default),
    }
}
