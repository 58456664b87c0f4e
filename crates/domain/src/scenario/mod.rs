//! Scenario: a locally persisted recurring rule: every `interval_hours`,
//! run a list of device actions, some of them delayed.
//!
//! The schedule invariants live here so every caller recomputes `next_run`
//! the same way: on creation, on a disabled → enabled transition, and after
//! every run.

mod action;
mod patch;

pub use action::{ActionPhase, MAX_DELAY_MINUTES, ScenarioAction};
pub use patch::ScenarioPatch;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::{SceneHubError, ValidationError};
use crate::id::ScenarioId;
use crate::time::{self, Timestamp, iso_millis};

/// Longest accepted interval between runs (ten years).
pub const MAX_INTERVAL_HOURS: f64 = 87_600.0;

/// A recurring automation definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: ScenarioId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub enabled: bool,
    #[serde(serialize_with = "serialize_js_number")]
    pub interval_hours: f64,
    /// Advisory "on" duration; the scheduler only honours what is baked into
    /// the action delays.
    #[serde(default, serialize_with = "serialize_js_number")]
    pub duration_minutes: f64,
    #[serde(default)]
    pub actions: Vec<ScenarioAction>,
    #[serde(default, with = "iso_millis::option")]
    pub last_run: Option<Timestamp>,
    #[serde(default, with = "iso_millis::option")]
    pub next_run: Option<Timestamp>,
    #[serde(with = "iso_millis")]
    pub created_at: Timestamp,
}

impl Scenario {
    /// Create a builder for constructing a [`Scenario`].
    #[must_use]
    pub fn builder() -> ScenarioBuilder {
        ScenarioBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`SceneHubError::Validation`] when:
    /// - `name` is blank ([`ValidationError::EmptyName`])
    /// - `interval_hours` is not in `(0, MAX_INTERVAL_HOURS]` ([`ValidationError::InvalidInterval`])
    /// - `duration_minutes` is negative or not finite ([`ValidationError::InvalidDuration`])
    /// - any action is invalid (see [`ScenarioAction::validate`])
    pub fn validate(&self) -> Result<(), SceneHubError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if !self.interval_hours.is_finite()
            || self.interval_hours <= 0.0
            || self.interval_hours > MAX_INTERVAL_HOURS
        {
            return Err(ValidationError::InvalidInterval.into());
        }
        if !self.duration_minutes.is_finite() || self.duration_minutes < 0.0 {
            return Err(ValidationError::InvalidDuration.into());
        }
        for action in &self.actions {
            action.validate()?;
        }
        Ok(())
    }

    /// The due time one interval after `now`.
    #[must_use]
    pub fn next_run_after(&self, now: Timestamp) -> Timestamp {
        time::add_hours(now, self.interval_hours)
    }

    /// Restart the schedule from `now`.
    pub fn reschedule(&mut self, now: Timestamp) {
        self.next_run = Some(self.next_run_after(now));
    }

    /// Flip `enabled`. Enabling restarts the schedule from `now`; disabling
    /// leaves `next_run` untouched.
    pub fn toggle(&mut self, now: Timestamp) {
        self.enabled = !self.enabled;
        if self.enabled {
            self.reschedule(now);
        }
    }

    /// Record a run at `now` and schedule the next one.
    pub fn mark_run(&mut self, now: Timestamp) {
        self.last_run = Some(now);
        self.reschedule(now);
    }

    /// Whether an automatic sweep at `now` should execute this scenario.
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.enabled && self.next_run.is_some_and(|next| next <= now)
    }

    /// Shallow-merge `patch` over this scenario.
    ///
    /// `next_run` only changes when the patch carries it explicitly or when
    /// the patch turns a disabled scenario on.
    pub fn apply(&mut self, patch: ScenarioPatch, now: Timestamp) {
        let was_enabled = self.enabled;
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(enabled) = patch.enabled {
            self.enabled = enabled;
        }
        if let Some(interval_hours) = patch.interval_hours {
            self.interval_hours = interval_hours;
        }
        if let Some(duration_minutes) = patch.duration_minutes {
            self.duration_minutes = duration_minutes;
        }
        if let Some(actions) = patch.actions {
            self.actions = actions;
        }
        if let Some(next_run) = patch.next_run {
            self.next_run = Some(next_run);
        } else if self.enabled && !was_enabled {
            self.reschedule(now);
        }
    }

    /// Iterate over the actions of one phase, in declared order.
    pub fn actions_in(&self, phase: ActionPhase) -> impl Iterator<Item = &ScenarioAction> {
        self.actions.iter().filter(move |a| a.phase() == phase)
    }
}

/// Step-by-step builder for [`Scenario`].
#[derive(Debug, Default)]
pub struct ScenarioBuilder {
    id: Option<ScenarioId>,
    name: Option<String>,
    description: Option<String>,
    enabled: Option<bool>,
    interval_hours: Option<f64>,
    duration_minutes: Option<f64>,
    actions: Vec<ScenarioAction>,
    last_run: Option<Timestamp>,
    next_run: Option<Timestamp>,
    created_at: Option<Timestamp>,
}

impl ScenarioBuilder {
    #[must_use]
    pub fn id(mut self, id: ScenarioId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn interval_hours(mut self, hours: f64) -> Self {
        self.interval_hours = Some(hours);
        self
    }

    #[must_use]
    pub fn duration_minutes(mut self, minutes: f64) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    #[must_use]
    pub fn action(mut self, action: ScenarioAction) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn actions(mut self, actions: impl IntoIterator<Item = ScenarioAction>) -> Self {
        self.actions.extend(actions);
        self
    }

    #[must_use]
    pub fn last_run(mut self, ts: Timestamp) -> Self {
        self.last_run = Some(ts);
        self
    }

    #[must_use]
    pub fn next_run(mut self, ts: Timestamp) -> Self {
        self.next_run = Some(ts);
        self
    }

    #[must_use]
    pub fn created_at(mut self, ts: Timestamp) -> Self {
        self.created_at = Some(ts);
        self
    }

    /// Consume the builder, validate, and return a [`Scenario`].
    ///
    /// Defaults: enabled, empty description, zero duration, no actions,
    /// created now, never run and not yet scheduled.
    ///
    /// # Errors
    ///
    /// Returns [`SceneHubError::Validation`] if required fields are missing or invalid.
    pub fn build(self) -> Result<Scenario, SceneHubError> {
        let scenario = Scenario {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            enabled: self.enabled.unwrap_or(true),
            interval_hours: self.interval_hours.unwrap_or_default(),
            duration_minutes: self.duration_minutes.unwrap_or_default(),
            actions: self.actions,
            last_run: self.last_run,
            next_run: self.next_run,
            created_at: self.created_at.unwrap_or_else(time::now),
        };
        scenario.validate()?;
        Ok(scenario)
    }
}

/// Write whole numbers without a fractional part (`3`, not `3.0`), matching
/// the documents produced by the dashboard.
#[allow(clippy::trivially_copy_pass_by_ref, clippy::cast_possible_truncation)]
pub(crate) fn serialize_js_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
