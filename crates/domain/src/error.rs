//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`SceneHubError`] via `From`. A missing scenario is never an error: lookups
//! return `Option`/`bool` so callers can tell "not found" apart from a broken
//! store.

/// Top-level error shared by ports, services, and adapters.
#[derive(Debug, thiserror::Error)]
pub enum SceneHubError {
    /// A domain invariant was violated.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The persistent store failed to read or write.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The external device-control capability failed.
    #[error("device control error")]
    DeviceControl(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A scenario run was torn down before it finished.
    #[error("scenario run interrupted")]
    Interrupted(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("interval must be a positive number of hours")]
    InvalidInterval,

    #[error("duration must be a non-negative number of minutes")]
    InvalidDuration,

    #[error("action device id must not be empty")]
    EmptyDeviceId,

    #[error("action delay must be between 0 and 525600 minutes")]
    InvalidDelay,
}

/// Render an error together with its `source()` chain, outermost first.
///
/// Used wherever an error has to be flattened into a message that ends up
/// in a persisted log entry.
#[must_use]
pub fn error_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
