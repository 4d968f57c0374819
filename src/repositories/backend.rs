use crate::error::{AppError, Result};
use crate::models::appliance::APPLIANCE_COUNT;
use crate::models::{
    parse_directives, Directive, OptimizationRequest, OptimizeResponse, HOURS_PER_DAY,
};
use serde::{Deserialize, Serialize};

/// Client for the dashboard backend: optimizer, consumption predictor and
/// appliance state sync.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    temperatures: &'a [f64],
    humidities: &'a [f64],
    winds: &'a [f64],
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<f64>,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    email: &'a str,
    appliances: [u8; APPLIANCE_COUNT],
    total: f64,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Ask the optimizer for ON/OFF suggestions. The free-text response is
    /// parsed into directives here, at the boundary; nothing downstream
    /// looks at the raw strings.
    pub async fn optimize(&self, request: &OptimizationRequest) -> Result<Vec<Directive>> {
        let response = self
            .client
            .post(format!("{}/optimize", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(|e| AppError::OptimizationFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::OptimizationFailed(format!(
                "backend returned {}",
                response.status()
            )));
        }

        let body: OptimizeResponse = response
            .json()
            .await
            .map_err(|e| AppError::OptimizationFailed(e.to_string()))?;
        Ok(parse_directives(&body.suggestions))
    }

    /// Ask the predictor for the baseline consumption curve. The arrays are
    /// calendar-hour indexed; exactly 24 predictions are expected back.
    pub async fn predict(
        &self,
        temperatures: &[f64],
        humidities: &[f64],
        winds: &[f64],
    ) -> Result<Vec<f64>> {
        let request = PredictRequest {
            temperatures,
            humidities,
            winds,
        };
        let response = self
            .client
            .post(format!("{}/predict_energy_consumption", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ForecastUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::ForecastUnavailable(format!(
                "backend returned {}",
                response.status()
            )));
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| AppError::ForecastUnavailable(e.to_string()))?;

        if body.predictions.len() != HOURS_PER_DAY {
            return Err(AppError::ForecastUnavailable(format!(
                "expected {} predictions, got {}",
                HOURS_PER_DAY,
                body.predictions.len()
            )));
        }
        Ok(body.predictions)
    }

    /// Mirror the committed appliance state to the backend.
    pub async fn update_states(
        &self,
        email: &str,
        appliances: [u8; APPLIANCE_COUNT],
        total: f64,
    ) -> Result<()> {
        let request = UpdateRequest {
            email,
            appliances,
            total,
        };
        self.client
            .post(format!("{}/update", self.base_url))
            .json(&request)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
