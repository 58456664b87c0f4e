//! reqwest implementation of [`DeviceControl`].

use std::time::Duration;

use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use scenehub_app::ports::DeviceControl;
use scenehub_domain::command::{CommandResult, DeviceCommand};
use scenehub_domain::error::SceneHubError;

use crate::error::CloudError;

/// Connection settings for the IoT cloud.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    /// e.g. `https://openapi.tuyaus.com`
    pub base_url: String,
    /// Sent as `Authorization: Bearer …` when present.
    pub access_token: Option<String>,
    /// Whole-request timeout.
    pub timeout: Duration,
}

#[derive(Serialize)]
struct CommandsBody<'a> {
    commands: &'a [DeviceCommand],
}

#[derive(Deserialize)]
struct CloudReply {
    success: bool,
    #[serde(default)]
    msg: Option<String>,
}

/// Sends command batches to the IoT cloud.
pub struct CloudDeviceControl {
    client: Client,
    base_url: Url,
    access_token: Option<String>,
}

impl CloudDeviceControl {
    /// Build the HTTP client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CloudError::InvalidBaseUrl`] for an unusable base URL, or
    /// [`CloudError::Http`] if the client cannot be constructed.
    pub fn new(config: CloudConfig) -> Result<Self, CloudError> {
        let base_url = Url::parse(&config.base_url).map_err(|err| CloudError::InvalidBaseUrl {
            url: config.base_url.clone(),
            source: Some(Box::new(err)),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CloudError::InvalidBaseUrl {
                url: config.base_url,
                source: None,
            });
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url,
            access_token: config.access_token.filter(|t| !t.is_empty()),
        })
    }

    fn commands_url(&self, device_id: &str) -> Url {
        let mut url = self.base_url.clone();
        // checked in `new`
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v1.0", "iot-03", "devices", device_id, "commands"]);
        }
        url
    }

    async fn post_commands(
        &self,
        device_id: &str,
        commands: &[DeviceCommand],
    ) -> Result<CommandResult, CloudError> {
        let mut request = self
            .client
            .post(self.commands_url(device_id))
            .json(&CommandsBody { commands });
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let reply: CloudReply = response.json().await.map_err(|source| CloudError::Decode {
            status: status.as_u16(),
            source,
        })?;

        if reply.success {
            Ok(CommandResult::ok())
        } else {
            let message = reply
                .msg
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("cloud rejected commands (HTTP {})", status.as_u16()));
            Ok(CommandResult::failure(message))
        }
    }
}

impl DeviceControl for CloudDeviceControl {
    #[tracing::instrument(skip(self, commands), fields(commands = commands.len()))]
    async fn send_commands(
        &self,
        device_id: &str,
        commands: &[DeviceCommand],
    ) -> Result<CommandResult, SceneHubError> {
        let result = self.post_commands(device_id, commands).await?;
        tracing::debug!(success = result.success, "cloud replied");
        Ok(result)
    }
}
