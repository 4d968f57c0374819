use crate::models::appliance::{ApplianceId, AppliancePowerState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payload for the backend optimizer. Field names follow its wire contract;
/// day/month/hour are real calendar values, the weather values are the
/// series at relative index 0.
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationRequest {
    #[serde(rename = "Day")]
    pub day: u32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Hour")]
    pub hour: u32,
    #[serde(rename = "Temperature")]
    pub temperature: f64,
    #[serde(rename = "Humidity")]
    pub humidity: f64,
    #[serde(rename = "WindSpeed")]
    pub wind_speed: f64,
    pub current_states: BTreeMap<&'static str, u8>,
}

/// Identity → 0/1 mapping as the optimizer expects it.
pub fn current_states_map(state: &AppliancePowerState) -> BTreeMap<&'static str, u8> {
    ApplianceId::ALL
        .iter()
        .map(|id| (id.name(), state.is_on(*id) as u8))
        .collect()
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptimizeResponse {
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// One ON/OFF instruction for a known appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    TurnOn(ApplianceId),
    TurnOff(ApplianceId),
}

impl Directive {
    pub fn target(&self) -> ApplianceId {
        match self {
            Directive::TurnOn(id) | Directive::TurnOff(id) => *id,
        }
    }

    /// Parse one suggestion line of the form `Turn ON <identity>` or
    /// `Turn OFF <identity>`. Lines matching neither pattern, or naming an
    /// identity outside the fixed set, yield `None`.
    pub fn parse(line: &str) -> Option<Directive> {
        if let Some(name) = line.strip_prefix("Turn ON ") {
            ApplianceId::from_name(name.trim()).map(Directive::TurnOn)
        } else if let Some(name) = line.strip_prefix("Turn OFF ") {
            ApplianceId::from_name(name.trim()).map(Directive::TurnOff)
        } else {
            None
        }
    }
}

/// Parse the optimizer's suggestion list, preserving order and dropping
/// whatever does not parse.
pub fn parse_directives(lines: &[String]) -> Vec<Directive> {
    lines.iter().filter_map(|line| Directive::parse(line)).collect()
}
