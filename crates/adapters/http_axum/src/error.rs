//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use scenehub_domain::error::{SceneHubError, error_chain};

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn response(status: StatusCode, message: impl Into<String>) -> Response {
        (
            status,
            Json(Self {
                error: message.into(),
            }),
        )
            .into_response()
    }
}

/// Maps [`SceneHubError`] to an HTTP response with appropriate status code.
pub struct ApiError(SceneHubError);

impl From<SceneHubError> for ApiError {
    fn from(err: SceneHubError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.0 {
            SceneHubError::Validation(err) => {
                ErrorBody::response(StatusCode::BAD_REQUEST, err.to_string())
            }
            SceneHubError::Storage(_)
            | SceneHubError::DeviceControl(_)
            | SceneHubError::Interrupted(_) => {
                tracing::error!(error = %error_chain(&self.0), "request failed");
                ErrorBody::response(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}
