pub mod appliances;
pub mod forecast;
pub mod optimizer;
pub mod weather;

pub use appliances::ApplianceStateService;
pub use forecast::ForecastService;
pub use optimizer::{
    reconcile, split_directives, summarize, OptimizationOutcome, OptimizerPhase,
    OptimizerService,
};
pub use weather::WeatherService;
