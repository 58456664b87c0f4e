//! Command dispatcher: turns every device-control failure into a structured
//! outcome so a run never aborts halfway.

use scenehub_domain::command::{CommandResult, DeviceCommand};
use scenehub_domain::error::error_chain;

use crate::ports::DeviceControl;

/// Wraps a [`DeviceControl`] so that sending never fails.
pub struct CommandDispatcher<D> {
    control: D,
}

impl<D: DeviceControl + Send + Sync> CommandDispatcher<D> {
    pub fn new(control: D) -> Self {
        Self { control }
    }

    /// Send `commands` to `device_id` as one request.
    ///
    /// Transport and protocol errors come back as a failed [`CommandResult`]
    /// carrying the rendered error chain.
    #[tracing::instrument(skip(self, commands), fields(commands = commands.len()))]
    pub async fn dispatch(&self, device_id: &str, commands: &[DeviceCommand]) -> CommandResult {
        match self.control.send_commands(device_id, commands).await {
            Ok(result) => {
                if !result.success {
                    tracing::warn!(
                        reason = result.message.as_deref().unwrap_or_default(),
                        "device refused commands"
                    );
                }
                result
            }
            Err(err) => {
                let message = error_chain(&err);
                tracing::warn!(error = %message, "failed to send commands");
                CommandResult::failure(message)
            }
        }
    }
}
