use crate::models::weather::HOURS_PER_DAY;
use serde::Serialize;

/// The two chart curves, calendar-hour indexed (position 0 = midnight).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastSeries {
    /// Model-predicted consumption with no extra appliances, kWh per hour.
    pub baseline: Vec<f64>,
    /// Baseline plus the committed appliance load.
    pub with_load: Vec<f64>,
}

impl ForecastSeries {
    pub fn zeroed() -> Self {
        Self {
            baseline: vec![0.0; HOURS_PER_DAY],
            with_load: vec![0.0; HOURS_PER_DAY],
        }
    }

    pub fn from_baseline(baseline: Vec<f64>, saved_total: f64) -> Self {
        let with_load = merge_with_total(&baseline, saved_total);
        Self {
            baseline,
            with_load,
        }
    }
}

/// Offset every hour of the baseline by the committed total: the forecast
/// if nothing changes, plus the load the user has already saved.
pub fn merge_with_total(baseline: &[f64], saved_total: f64) -> Vec<f64> {
    baseline.iter().map(|v| v + saved_total).collect()
}
