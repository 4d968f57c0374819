use crate::error::Result;
use crate::models::{wind_to_kmh, HourlyWeather, WeatherSnapshot};
use crate::repositories::store::{KEY_HOURLY_HUMIDITY, KEY_HOURLY_TEMP, KEY_HOURLY_WIND};
use crate::repositories::{StateStore, WeatherProvider};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};

/// Fetches the hourly series, converts wind to km/h and persists it for the
/// other services to read.
pub struct WeatherService {
    provider: WeatherProvider,
    store: StateStore,
    refresh_seq: AtomicU64,
}

impl WeatherService {
    pub fn new(provider: WeatherProvider, store: StateStore) -> Self {
        Self {
            provider,
            store,
            refresh_seq: AtomicU64::new(0),
        }
    }

    /// Persist a fetched series, or mark all three series absent so readers
    /// never see stale or partial numbers.
    pub fn store_series(&self, series: Option<&HourlyWeather>) {
        match series {
            Some(series) if series.is_complete() => {
                self.store
                    .set_json_array(KEY_HOURLY_TEMP, Some(&series.temperature));
                self.store
                    .set_json_array(KEY_HOURLY_HUMIDITY, Some(&series.humidity));
                self.store.set_json_array(KEY_HOURLY_WIND, Some(&series.wind));
            }
            _ => {
                self.store.set_json_array(KEY_HOURLY_TEMP, None);
                self.store.set_json_array(KEY_HOURLY_HUMIDITY, None);
                self.store.set_json_array(KEY_HOURLY_WIND, None);
            }
        }
    }

    /// Fetch and store the latest series. Returns Ok(true) when the store
    /// was updated and Ok(false) when a newer refresh was issued while this
    /// one was in flight; a superseded response is discarded, not stored.
    pub async fn refresh(&self) -> Result<bool> {
        let seq = self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1;
        // Readers must treat an in-flight refresh as "no data", not reuse
        // whatever was cached before.
        self.store_series(None);

        let fetched = self.provider.fetch_hourly().await;

        if self.refresh_seq.load(Ordering::SeqCst) != seq {
            debug!(seq, "discarding superseded weather response");
            return Ok(false);
        }

        match fetched {
            Ok(raw) => {
                let converted = HourlyWeather {
                    temperature: raw.temperature,
                    humidity: raw.humidity,
                    wind: raw.wind.into_iter().map(wind_to_kmh).collect(),
                };
                self.store_series(Some(&converted));
                info!(seq, "weather series refreshed");
                Ok(true)
            }
            Err(e) => {
                self.store_series(None);
                Err(e)
            }
        }
    }

    /// The stored series, if all three arrays are present and complete.
    pub fn stored_series(&self) -> Option<HourlyWeather> {
        let series = HourlyWeather {
            temperature: self.store.get_json_array(KEY_HOURLY_TEMP)?,
            humidity: self.store.get_json_array(KEY_HOURLY_HUMIDITY)?,
            wind: self.store.get_json_array(KEY_HOURLY_WIND)?,
        };
        series.is_complete().then_some(series)
    }

    /// Weather at relative index 0, or no data.
    pub fn current_snapshot(&self) -> Option<WeatherSnapshot> {
        self.stored_series()?.snapshot()
    }
}
