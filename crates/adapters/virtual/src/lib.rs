//! # scenehub-adapter-virtual
//!
//! Simulated devices implementing `DeviceControl`, for demos and tests.
//!
//! ## Provided devices
//!
//! | Device id | Name | Codes |
//! |-----------|------|-------|
//! | `virtual_switch` | Virtual Switch | `switch_1` |
//! | `virtual_light` | Virtual Light | `switch_led`, `bright_value`, `work_mode` |
//! | `virtual_pump` | Virtual Pump | `switch_1`, `countdown_1` |
//!
//! Each device remembers the last value written per code. Unknown devices and
//! unsupported codes are refused with a failed result, like the cloud does.
//!
//! ## Dependency rule
//!
//! Depends on `scenehub-app` (port traits) and `scenehub-domain` only.

mod device;

use std::collections::HashMap;

use scenehub_app::ports::DeviceControl;
use scenehub_domain::command::{CommandResult, CommandValue, DeviceCommand};
use scenehub_domain::error::SceneHubError;

use device::VirtualDevice;

/// Device control backed by in-memory simulated devices.
pub struct VirtualDeviceControl {
    devices: HashMap<&'static str, VirtualDevice>,
}

impl Default for VirtualDeviceControl {
    fn default() -> Self {
        let devices = HashMap::from([
            (
                "virtual_switch",
                VirtualDevice::new("Virtual Switch", &["switch_1"]),
            ),
            (
                "virtual_light",
                VirtualDevice::new(
                    "Virtual Light",
                    &["switch_led", "bright_value", "work_mode"],
                ),
            ),
            (
                "virtual_pump",
                VirtualDevice::new("Virtual Pump", &["switch_1", "countdown_1"]),
            ),
        ]);
        Self { devices }
    }
}

impl VirtualDeviceControl {
    /// `(device id, name)` of every simulated device, sorted by id.
    #[must_use]
    pub fn devices(&self) -> Vec<(&'static str, &'static str)> {
        let mut devices: Vec<_> = self
            .devices
            .iter()
            .map(|(id, device)| (*id, device.name()))
            .collect();
        devices.sort_unstable();
        devices
    }

    /// Last value written to `code` on `device_id`.
    #[must_use]
    pub fn value(&self, device_id: &str, code: &str) -> Option<CommandValue> {
        self.devices.get(device_id)?.value(code)
    }
}

impl DeviceControl for VirtualDeviceControl {
    async fn send_commands(
        &self,
        device_id: &str,
        commands: &[DeviceCommand],
    ) -> Result<CommandResult, SceneHubError> {
        let Some(device) = self.devices.get(device_id) else {
            return Ok(CommandResult::failure(format!(
                "device not found: {device_id}"
            )));
        };
        let result = device.apply(commands);
        tracing::debug!(
            device_id,
            device_name = device.name(),
            success = result.success,
            "virtual device handled commands"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_provide_three_devices() {
        let control = VirtualDeviceControl::default();
        assert_eq!(
            control.devices(),
            [
                ("virtual_light", "Virtual Light"),
                ("virtual_pump", "Virtual Pump"),
                ("virtual_switch", "Virtual Switch"),
            ]
        );
    }

    #[tokio::test]
    async fn should_switch_pump_on_then_off() {
        let control = VirtualDeviceControl::default();

        let on = control
            .send_commands("virtual_pump", &[DeviceCommand::new("switch_1", true)])
            .await
            .unwrap();
        assert!(on.success);
        assert_eq!(
            control.value("virtual_pump", "switch_1"),
            Some(CommandValue::Bool(true))
        );

        control
            .send_commands("virtual_pump", &[DeviceCommand::new("switch_1", false)])
            .await
            .unwrap();
        assert_eq!(
            control.value("virtual_pump", "switch_1"),
            Some(CommandValue::Bool(false))
        );
    }

    #[tokio::test]
    async fn should_set_light_mode_and_brightness_in_one_batch() {
        let control = VirtualDeviceControl::default();

        let result = control
            .send_commands(
                "virtual_light",
                &[
                    DeviceCommand::new("bright_value", 800),
                    DeviceCommand::new("work_mode", "white"),
                ],
            )
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(
            control.value("virtual_light", "work_mode"),
            Some(CommandValue::from("white"))
        );
    }

    #[tokio::test]
    async fn should_refuse_unknown_device() {
        let control = VirtualDeviceControl::default();

        let result = control
            .send_commands("bf-missing", &[DeviceCommand::new("switch_1", true)])
            .await
            .unwrap();

        assert!(!result.success);
        assert_eq!(
            result.message.as_deref(),
            Some("device not found: bf-missing")
        );
    }

    #[tokio::test]
    async fn should_leave_other_devices_untouched() {
        let control = VirtualDeviceControl::default();

        control
            .send_commands("virtual_switch", &[DeviceCommand::new("switch_1", true)])
            .await
            .unwrap();

        assert!(control.value("virtual_pump", "switch_1").is_none());
    }
}
