//! Scenario store port: persistence for scenarios and their run logs.

use std::future::Future;

use scenehub_domain::error::SceneHubError;
use scenehub_domain::scenario::Scenario;
use scenehub_domain::scenario_log::ScenarioLog;

/// Durable home of the scenario collection and the run log.
///
/// Implementations treat a missing or unreadable backing resource as an empty
/// collection: `load` and `load_logs` only fail when the store itself is
/// unreachable.
pub trait ScenarioStore {
    /// Read every scenario, in insertion order.
    fn load(&self) -> impl Future<Output = Result<Vec<Scenario>, SceneHubError>> + Send;

    /// Replace the whole scenario collection.
    fn save(&self, scenarios: &[Scenario])
    -> impl Future<Output = Result<(), SceneHubError>> + Send;

    /// Read the run log, newest first.
    fn load_logs(&self) -> impl Future<Output = Result<Vec<ScenarioLog>, SceneHubError>> + Send;

    /// Prepend one log entry, evicting the oldest beyond
    /// [`MAX_LOGS`](scenehub_domain::scenario_log::MAX_LOGS).
    fn append_log(&self, log: ScenarioLog)
    -> impl Future<Output = Result<(), SceneHubError>> + Send;
}

impl<T: ScenarioStore + Send + Sync> ScenarioStore for std::sync::Arc<T> {
    fn load(&self) -> impl Future<Output = Result<Vec<Scenario>, SceneHubError>> + Send {
        (**self).load()
    }

    fn save(
        &self,
        scenarios: &[Scenario],
    ) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        (**self).save(scenarios)
    }

    fn load_logs(&self) -> impl Future<Output = Result<Vec<ScenarioLog>, SceneHubError>> + Send {
        (**self).load_logs()
    }

    fn append_log(&self, log: ScenarioLog) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        (**self).append_log(log)
    }
}
