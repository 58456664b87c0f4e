//! Device control port: the external capability that actually switches
//! devices.

use std::future::Future;

use scenehub_domain::command::{CommandResult, DeviceCommand};
use scenehub_domain::error::SceneHubError;

/// Sends a batch of commands to one device in a single request.
///
/// A device that answers with a refusal is an `Ok` with
/// [`CommandResult::success`] set to `false`; an `Err` means the request
/// never got an answer.
pub trait DeviceControl {
    fn send_commands(
        &self,
        device_id: &str,
        commands: &[DeviceCommand],
    ) -> impl Future<Output = Result<CommandResult, SceneHubError>> + Send;
}

impl<T: DeviceControl + Send + Sync> DeviceControl for std::sync::Arc<T> {
    fn send_commands(
        &self,
        device_id: &str,
        commands: &[DeviceCommand],
    ) -> impl Future<Output = Result<CommandResult, SceneHubError>> + Send {
        (**self).send_commands(device_id, commands)
    }
}
