//! Scenario action: one command batch for one device, optionally delayed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::command::DeviceCommand;
use crate::error::ValidationError;

/// Longest accepted wait before a delayed action (one year).
pub const MAX_DELAY_MINUTES: f64 = 525_600.0;

/// Which phase of a scenario run an action belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionPhase {
    /// Runs synchronously, in declared order, when the scenario fires.
    Immediate,
    /// Runs `delay_minutes` after the scenario fires.
    Delayed,
}

/// A command batch sent atomically to a single device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioAction {
    /// Device identifier understood by the device-control capability.
    pub device_id: String,
    /// Display copy of the device name; not authoritative.
    #[serde(default)]
    pub device_name: String,
    pub commands: Vec<DeviceCommand>,
    /// `0` runs immediately; anything greater runs that many minutes later.
    #[serde(default, serialize_with = "super::serialize_js_number")]
    pub delay_minutes: f64,
}

impl ScenarioAction {
    /// Create an action that runs as soon as the scenario fires.
    #[must_use]
    pub fn immediate(
        device_id: impl Into<String>,
        device_name: impl Into<String>,
        commands: Vec<DeviceCommand>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            device_name: device_name.into(),
            commands,
            delay_minutes: 0.0,
        }
    }

    /// Create an action that runs `delay_minutes` after the scenario fires.
    #[must_use]
    pub fn delayed(
        device_id: impl Into<String>,
        device_name: impl Into<String>,
        commands: Vec<DeviceCommand>,
        delay_minutes: f64,
    ) -> Self {
        Self {
            delay_minutes,
            ..Self::immediate(device_id, device_name, commands)
        }
    }

    /// Phase this action runs in.
    #[must_use]
    pub fn phase(&self) -> ActionPhase {
        if self.delay_minutes > 0.0 {
            ActionPhase::Delayed
        } else {
            ActionPhase::Immediate
        }
    }

    /// Time to wait after the scenario fires.
    ///
    /// Saturates instead of collapsing to zero, so a delay too large to
    /// represent never fires early.
    #[must_use]
    pub fn delay(&self) -> Duration {
        if self.delay_minutes <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(self.delay_minutes * 60.0).unwrap_or(Duration::MAX)
    }

    /// Human-readable description used in run logs.
    ///
    /// Delayed actions are prefixed with `[After N min]`.
    #[must_use]
    pub fn describe(&self, phase: ActionPhase) -> String {
        let commands = serde_json::to_string(&self.commands).unwrap_or_default();
        let label = if self.device_name.is_empty() {
            &self.device_id
        } else {
            &self.device_name
        };
        match phase {
            ActionPhase::Immediate => format!("Send commands to {label}: {commands}"),
            ActionPhase::Delayed => format!(
                "[After {} min] Send commands to {label}: {commands}",
                self.delay_minutes
            ),
        }
    }

    /// Check action invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyDeviceId`] or
    /// [`ValidationError::InvalidDelay`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.device_id.trim().is_empty() {
            return Err(ValidationError::EmptyDeviceId);
        }
        if !self.delay_minutes.is_finite()
            || self.delay_minutes < 0.0
            || self.delay_minutes > MAX_DELAY_MINUTES
        {
            return Err(ValidationError::InvalidDelay);
        }
        Ok(())
    }
}
