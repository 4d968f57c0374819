use crate::error::Result;
use crate::models::{rotate_to_hour, ForecastSeries, HOURS_PER_DAY};
use crate::repositories::store::KEY_TOTAL;
use crate::repositories::{BackendClient, StateStore};
use crate::services::weather::WeatherService;
use chrono::{DateTime, Local, Timelike};
use tracing::info;

/// Produces the two chart curves: the predicted baseline and the baseline
/// plus the committed appliance load.
pub struct ForecastService {
    backend: BackendClient,
    store: StateStore,
    current: ForecastSeries,
}

impl ForecastService {
    pub fn new(backend: BackendClient, store: StateStore) -> Self {
        Self {
            backend,
            store,
            current: ForecastSeries::zeroed(),
        }
    }

    pub fn current(&self) -> &ForecastSeries {
        &self.current
    }

    /// Fetch predictions for the stored weather rotated to calendar hours
    /// and merge in the saved total. With no usable weather the with-load
    /// curve falls back to a flat line at the saved total; on a failed
    /// fetch the previous curves are kept and the error is surfaced.
    pub async fn refresh(
        &mut self,
        weather: &WeatherService,
        now: DateTime<Local>,
    ) -> Result<&ForecastSeries> {
        let saved_total = self.store.get_number(KEY_TOTAL);

        match weather.stored_series() {
            Some(series) => {
                let hour = now.hour();
                let temperatures = rotate_to_hour(&series.temperature, hour);
                let humidities = rotate_to_hour(&series.humidity, hour);
                let winds = rotate_to_hour(&series.wind, hour);

                let baseline = self
                    .backend
                    .predict(&temperatures, &humidities, &winds)
                    .await?;
                // An unset total is indistinguishable from zero load here.
                self.current =
                    ForecastSeries::from_baseline(baseline, saved_total.unwrap_or(0.0));
                info!(hour, "forecast refreshed");
            }
            None => {
                if let Some(total) = saved_total {
                    self.current.with_load = vec![total; HOURS_PER_DAY];
                    info!(total, "no weather data; flat forecast from saved total");
                }
            }
        }
        Ok(&self.current)
    }
}
