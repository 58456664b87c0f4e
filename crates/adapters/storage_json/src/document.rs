//! On-disk document shapes.
//!
//! Current files wrap the collection in `{"version": 1, ...}`. Files written
//! before versioning are a bare array and read as version 0.

use serde::{Deserialize, Serialize};

use scenehub_domain::scenario::Scenario;
use scenehub_domain::scenario_log::ScenarioLog;

pub const CURRENT_VERSION: u32 = 1;

#[derive(Deserialize)]
#[serde(untagged)]
pub enum ScenariosDocument {
    Versioned { version: u32, scenarios: Vec<Scenario> },
    Legacy(Vec<Scenario>),
}

impl ScenariosDocument {
    pub fn version(&self) -> u32 {
        match self {
            Self::Versioned { version, .. } => *version,
            Self::Legacy(_) => 0,
        }
    }

    pub fn into_scenarios(self) -> Vec<Scenario> {
        match self {
            Self::Versioned { scenarios, .. } | Self::Legacy(scenarios) => scenarios,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
pub enum LogsDocument {
    Versioned { version: u32, logs: Vec<ScenarioLog> },
    Legacy(Vec<ScenarioLog>),
}

impl LogsDocument {
    pub fn version(&self) -> u32 {
        match self {
            Self::Versioned { version, .. } => *version,
            Self::Legacy(_) => 0,
        }
    }

    pub fn into_logs(self) -> Vec<ScenarioLog> {
        match self {
            Self::Versioned { logs, .. } | Self::Legacy(logs) => logs,
        }
    }
}

#[derive(Serialize)]
pub struct ScenariosOut<'a> {
    pub version: u32,
    pub scenarios: &'a [Scenario],
}

#[derive(Serialize)]
pub struct LogsOut<'a> {
    pub version: u32,
    pub logs: &'a [ScenarioLog],
}
