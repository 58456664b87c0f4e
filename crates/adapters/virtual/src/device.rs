//! A simulated device: a fixed set of data-point codes and their last values.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use scenehub_domain::command::{CommandResult, CommandValue, DeviceCommand};

pub struct VirtualDevice {
    name: &'static str,
    codes: &'static [&'static str],
    state: Mutex<HashMap<String, CommandValue>>,
}

impl VirtualDevice {
    pub fn new(name: &'static str, codes: &'static [&'static str]) -> Self {
        Self {
            name,
            codes,
            state: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply the whole batch or nothing.
    pub fn apply(&self, commands: &[DeviceCommand]) -> CommandResult {
        if let Some(unsupported) = commands
            .iter()
            .find(|c| !self.codes.contains(&c.code.as_str()))
        {
            return CommandResult::failure(format!(
                "command or value not support: {}",
                unsupported.code
            ));
        }
        let mut state = self.lock();
        for command in commands {
            state.insert(command.code.clone(), command.value.clone());
        }
        CommandResult::ok()
    }

    pub fn value(&self, code: &str) -> Option<CommandValue> {
        self.lock().get(code).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CommandValue>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_record_last_value_per_code() {
        let device = VirtualDevice::new("Lamp", &["switch_led", "bright_value"]);

        device.apply(&[DeviceCommand::new("switch_led", true)]);
        device.apply(&[
            DeviceCommand::new("switch_led", false),
            DeviceCommand::new("bright_value", 40),
        ]);

        assert_eq!(device.value("switch_led"), Some(CommandValue::Bool(false)));
        assert_eq!(device.value("bright_value"), Some(CommandValue::from(40)));
    }

    #[test]
    fn should_reject_whole_batch_with_unsupported_code() {
        let device = VirtualDevice::new("Plug", &["switch_1"]);

        let result = device.apply(&[
            DeviceCommand::new("switch_1", true),
            DeviceCommand::new("temp_set", 22),
        ]);

        assert!(!result.success);
        assert_eq!(
            result.message.as_deref(),
            Some("command or value not support: temp_set")
        );
        assert!(device.value("switch_1").is_none());
    }
}
