//! Device commands: the `{code, value}` pairs sent to a device in one
//! request, and the result reported back by the device-control capability.

use serde::{Deserialize, Serialize};

/// A single data-point command, e.g. `{"code": "switch_1", "value": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceCommand {
    /// Data-point code understood by the device (e.g. `"switch_1"`).
    pub code: String,
    /// Value to set.
    pub value: CommandValue,
}

impl DeviceCommand {
    /// Build a command from a code and anything convertible to a value.
    #[must_use]
    pub fn new(code: impl Into<String>, value: impl Into<CommandValue>) -> Self {
        Self {
            code: code.into(),
            value: value.into(),
        }
    }
}

/// Value of a device command: boolean, number, or string.
///
/// Numbers are kept as [`serde_json::Number`] so `100` stays `100` and never
/// turns into `100.0` on the way back to disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommandValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl From<bool> for CommandValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for CommandValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for CommandValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CommandValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Outcome of sending one command batch to a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl CommandResult {
    /// A successful result without a message.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// A failed result carrying a human-readable reason.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}
