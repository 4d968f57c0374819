pub mod appliance;
pub mod forecast;
pub mod optimizer;
pub mod weather;

pub use appliance::{ApplianceId, AppliancePowerState, APPLIANCE_COUNT};
pub use forecast::{merge_with_total, ForecastSeries};
pub use optimizer::{
    current_states_map, parse_directives, Directive, OptimizationRequest, OptimizeResponse,
};
pub use weather::{rotate_to_hour, wind_to_kmh, HourlyWeather, WeatherSnapshot, HOURS_PER_DAY};
