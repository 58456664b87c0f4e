//! Cloud adapter error type wrapping reqwest errors.

use scenehub_domain::error::SceneHubError;

/// Errors talking to the IoT cloud.
#[derive(Debug, thiserror::Error)]
pub enum CloudError {
    /// The configured base URL does not parse or cannot carry a path.
    #[error("invalid cloud base URL `{url}`")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Building the client, sending the request, or reading the reply failed.
    #[error("cloud request failed")]
    Http(#[from] reqwest::Error),

    /// The cloud answered with something other than its JSON envelope.
    #[error("unexpected cloud reply (HTTP {status})")]
    Decode {
        status: u16,
        #[source]
        source: reqwest::Error,
    },
}

impl From<CloudError> for SceneHubError {
    fn from(err: CloudError) -> Self {
        Self::DeviceControl(Box::new(err))
    }
}
