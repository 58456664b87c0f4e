//! Scenario log: one immutable record per executed action.

use serde::{Deserialize, Serialize};

use crate::command::CommandResult;
use crate::id::{ScenarioId, ScenarioLogId};
use crate::scenario::{ActionPhase, ScenarioAction};
use crate::time::{Timestamp, iso_millis};

/// Number of log entries retained by the store.
pub const MAX_LOGS: usize = 100;

/// Outcome of one action within one scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioLog {
    pub id: ScenarioLogId,
    pub scenario_id: ScenarioId,
    /// Scenario name at the time of the run.
    pub scenario_name: String,
    /// Human-readable action description.
    pub action: String,
    #[serde(with = "iso_millis")]
    pub timestamp: Timestamp,
    pub success: bool,
    pub message: String,
}

impl ScenarioLog {
    /// Build the log entry for an action that was just dispatched.
    ///
    /// Successful results are logged as `"Success"`; failures carry the
    /// device-control message, or `"Error"` when it gave none.
    #[must_use]
    pub fn for_action(
        scenario_id: ScenarioId,
        scenario_name: impl Into<String>,
        action: &ScenarioAction,
        phase: ActionPhase,
        result: &CommandResult,
        timestamp: Timestamp,
    ) -> Self {
        let message = if result.success {
            "Success".to_string()
        } else {
            result
                .message
                .clone()
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| "Error".to_string())
        };
        Self {
            id: ScenarioLogId::new(),
            scenario_id,
            scenario_name: scenario_name.into(),
            action: action.describe(phase),
            timestamp,
            success: result.success,
            message,
        }
    }
}

/// Prepend `log` (newest first) and drop everything beyond `cap`.
pub fn push_capped(logs: &mut Vec<ScenarioLog>, log: ScenarioLog, cap: usize) {
    logs.insert(0, log);
    logs.truncate(cap);
}
