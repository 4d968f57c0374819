use serde::{Deserialize, Serialize};

pub const HOURS_PER_DAY: usize = 24;

/// Hourly weather as fetched from the provider: three parallel 24-entry
/// series, relative-indexed. Position 0 is the hour the fetch happened,
/// position i is i hours later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyWeather {
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    pub wind: Vec<f64>,
}

impl HourlyWeather {
    /// All three series carry the full 24-hour horizon. A partial series is
    /// treated as no series at all.
    pub fn is_complete(&self) -> bool {
        self.temperature.len() == HOURS_PER_DAY
            && self.humidity.len() == HOURS_PER_DAY
            && self.wind.len() == HOURS_PER_DAY
    }

    /// Conditions at relative index 0, i.e. right now.
    pub fn snapshot(&self) -> Option<WeatherSnapshot> {
        if !self.is_complete() {
            return None;
        }
        Some(WeatherSnapshot {
            temperature: self.temperature[0],
            humidity: self.humidity[0],
            wind: self.wind[0],
        })
    }
}

/// Current conditions: temperature in °C, relative humidity in %, wind in
/// km/h.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    pub wind: f64,
}

/// Convert the provider's m/s wind speed to km/h, rounded to one decimal.
pub fn wind_to_kmh(meters_per_second: f64) -> f64 {
    (meters_per_second * 3.6 * 10.0).round() / 10.0
}

/// Re-index a relative series so that position 0 corresponds to hour 0 of
/// the calendar day: `rotated[i] = series[(i - current_hour + 24) mod 24]`.
/// `current_hour = 0` is a no-op.
pub fn rotate_to_hour(series: &[f64], current_hour: u32) -> Vec<f64> {
    let len = series.len();
    if len == 0 {
        return Vec::new();
    }
    let split = (len - current_hour as usize % len) % len;
    let mut rotated = Vec::with_capacity(len);
    rotated.extend_from_slice(&series[split..]);
    rotated.extend_from_slice(&series[..split]);
    rotated
}
