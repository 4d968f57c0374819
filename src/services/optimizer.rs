use crate::error::{AppError, Result};
use crate::models::{
    current_states_map, ApplianceId, AppliancePowerState, Directive, OptimizationRequest,
    WeatherSnapshot,
};
use crate::repositories::BackendClient;
use chrono::{DateTime, Datelike, Local, Timelike};
use tracing::info;

/// Where the optimizer action currently is; gates re-runs and the
/// follow-up apply/save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerPhase {
    Idle,
    Requesting,
    SuggestionsApplied,
    Failed,
}

/// Outcome of one optimizer run: what was applied, the sentence shown to
/// the user and the recomputed total.
#[derive(Debug, Clone)]
pub struct OptimizationOutcome {
    pub directives: Vec<Directive>,
    pub summary: String,
    pub total_consumption: f64,
}

pub struct OptimizerService {
    backend: BackendClient,
    phase: OptimizerPhase,
}

impl OptimizerService {
    pub fn new(backend: BackendClient) -> Self {
        Self {
            backend,
            phase: OptimizerPhase::Idle,
        }
    }

    pub fn phase(&self) -> OptimizerPhase {
        self.phase
    }

    /// Only a run that actually applied suggestions may be saved.
    pub fn can_apply(&self) -> bool {
        self.phase == OptimizerPhase::SuggestionsApplied
    }

    /// Assemble the optimizer payload from the real calendar time and the
    /// weather snapshot at relative index 0. Validation happens here,
    /// before any network traffic.
    pub fn build_request(
        now: DateTime<Local>,
        snapshot: Option<WeatherSnapshot>,
        state: &AppliancePowerState,
    ) -> Result<OptimizationRequest> {
        let snapshot = snapshot.ok_or_else(|| {
            AppError::InvalidWeatherData("weather series is missing or incomplete".to_string())
        })?;

        for (label, value) in [
            ("temperature", snapshot.temperature),
            ("humidity", snapshot.humidity),
            ("wind speed", snapshot.wind),
        ] {
            if !value.is_finite() {
                return Err(AppError::InvalidWeatherData(format!(
                    "{} is not a finite number",
                    label
                )));
            }
        }

        Ok(OptimizationRequest {
            day: now.day(),
            month: now.month(),
            hour: now.hour(),
            temperature: snapshot.temperature,
            humidity: snapshot.humidity,
            wind_speed: snapshot.wind,
            current_states: current_states_map(state),
        })
    }

    /// Run one optimize cycle: submit, reconcile, summarize. A run is
    /// refused while another is in flight; a backend failure moves the
    /// phase to `Failed` and leaves the appliance state untouched.
    pub async fn run(
        &mut self,
        request: OptimizationRequest,
        state: &mut AppliancePowerState,
    ) -> Result<OptimizationOutcome> {
        if self.phase == OptimizerPhase::Requesting {
            return Err(AppError::OptimizationFailed(
                "an optimizer request is already in flight".to_string(),
            ));
        }
        self.phase = OptimizerPhase::Requesting;

        let directives = match self.backend.optimize(&request).await {
            Ok(directives) => directives,
            Err(e) => {
                self.phase = OptimizerPhase::Failed;
                return Err(e);
            }
        };

        reconcile(state, &directives);
        let total_consumption = state.total_consumption();

        let (turn_on, turn_off) = split_directives(&directives);
        let summary = summarize(&turn_on, &turn_off);

        // An empty suggestion set applies nothing, so there is nothing to
        // save; the cycle goes back to idle.
        self.phase = if directives.is_empty() {
            OptimizerPhase::Idle
        } else {
            OptimizerPhase::SuggestionsApplied
        };
        info!(
            applied = directives.len(),
            total = total_consumption,
            "optimizer run finished"
        );

        Ok(OptimizationOutcome {
            directives,
            summary,
            total_consumption,
        })
    }
}

/// Apply directives in response order; the last directive naming an
/// appliance wins. Appliances never named keep their state.
pub fn reconcile(state: &mut AppliancePowerState, directives: &[Directive]) {
    for directive in directives {
        match directive {
            Directive::TurnOn(id) => state.set(*id, true),
            Directive::TurnOff(id) => state.set(*id, false),
        }
    }
}

/// Split a directive list into turn-on and turn-off targets, preserving
/// response order.
pub fn split_directives(directives: &[Directive]) -> (Vec<ApplianceId>, Vec<ApplianceId>) {
    let mut turn_on = Vec::new();
    let mut turn_off = Vec::new();
    for directive in directives {
        match directive {
            Directive::TurnOn(id) => turn_on.push(*id),
            Directive::TurnOff(id) => turn_off.push(*id),
        }
    }
    (turn_on, turn_off)
}

/// Human-readable sentence for a suggestion set. Pure text formatting:
/// exactly the supplied identities, in order.
pub fn summarize(turn_on: &[ApplianceId], turn_off: &[ApplianceId]) -> String {
    match (turn_on.is_empty(), turn_off.is_empty()) {
        (true, true) => "No changes needed. You're good to go!".to_string(),
        (false, false) => format!(
            "You can turn on {}. Make sure to turn off {}.",
            join_names(turn_on),
            join_names(turn_off)
        ),
        (false, true) => format!("You can turn on {}.", join_names(turn_on)),
        (true, false) => format!(
            "Load is too much, consider closing {}.",
            join_names(turn_off)
        ),
    }
}

/// "the TV", "the TV and the AC", "the TV, the AC and the Fan".
fn join_names(ids: &[ApplianceId]) -> String {
    match ids {
        [] => String::new(),
        [only] => format!("the {}", only.name()),
        [init @ .., last] => {
            let init = init
                .iter()
                .map(|id| format!("the {}", id.name()))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} and the {}", init, last.name())
        }
    }
}
