use crate::error::Result;
use crate::models::HourlyWeather;
use serde::Deserialize;

/// Client for the hourly weather provider.
#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: reqwest::Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: HourlyFields,
}

#[derive(Debug, Deserialize)]
struct HourlyFields {
    temperature_2m: Vec<f64>,
    relative_humidity_2m: Vec<f64>,
    wind_speed_10m: Vec<f64>,
}

impl WeatherProvider {
    pub fn new(base_url: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            latitude,
            longitude,
        }
    }

    /// Fetch the next 24 hours of temperature, humidity and wind speed.
    /// Wind comes back in the provider's native m/s.
    pub async fn fetch_hourly(&self) -> Result<HourlyWeather> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                (
                    "hourly",
                    "temperature_2m,relative_humidity_2m,wind_speed_10m".to_string(),
                ),
                ("forecast_hours", "24".to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let body: ForecastResponse = response.json().await?;
        Ok(HourlyWeather {
            temperature: body.hourly.temperature_2m,
            humidity: body.hourly.relative_humidity_2m,
            wind: body.hourly.wind_speed_10m,
        })
    }
}
