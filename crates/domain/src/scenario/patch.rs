//! Partial update of a scenario's editable fields.

use serde::Deserialize;

use super::ScenarioAction;
use crate::time::{Timestamp, iso_millis};

/// Fields to shallow-merge over an existing [`Scenario`](super::Scenario).
///
/// `id`, `created_at` and `last_run` are not editable.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub interval_hours: Option<f64>,
    pub duration_minutes: Option<f64>,
    pub actions: Option<Vec<ScenarioAction>>,
    #[serde(default, with = "iso_millis::option")]
    pub next_run: Option<Timestamp>,
}
