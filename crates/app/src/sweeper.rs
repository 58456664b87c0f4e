//! Due-scenario sweeper: finds scenarios whose `next_run` has passed and
//! executes them one at a time.

use std::sync::Arc;
use std::time::Duration;

use scenehub_domain::error::SceneHubError;
use scenehub_domain::id::ScenarioId;
use tokio::time::MissedTickBehavior;

use crate::executor::ScenarioExecutor;
use crate::ports::{Clock, DeviceControl, ScenarioStore};
use crate::services::scenario_service::ScenarioService;

/// Finds due scenarios and hands them to the executor, either on demand or
/// on a fixed period.
pub struct ScenarioSweeper<S, D, C> {
    scenarios: Arc<ScenarioService<S, C>>,
    executor: Arc<ScenarioExecutor<S, D, C>>,
}

impl<S, D, C> ScenarioSweeper<S, D, C>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub fn new(
        scenarios: Arc<ScenarioService<S, C>>,
        executor: Arc<ScenarioExecutor<S, D, C>>,
    ) -> Self {
        Self {
            scenarios,
            executor,
        }
    }

    /// Execute every enabled scenario that is due, in list order.
    ///
    /// Works on a snapshot taken when the sweep starts. A scenario whose run
    /// cannot be recorded is skipped and left out of the result; the sweep
    /// carries on with the rest.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the snapshot cannot be loaded.
    pub async fn check_and_run(&self) -> Result<Vec<String>, SceneHubError> {
        let now = self.scenarios.now();
        let snapshot = self.scenarios.list().await?;
        let mut executed = Vec::new();

        for scenario in snapshot.iter().filter(|s| s.is_due(now)) {
            match self.executor.execute(scenario).await {
                Ok(_) => executed.push(scenario.name.clone()),
                Err(err) => tracing::warn!(
                    error = %err,
                    scenario_id = %scenario.id,
                    "scenario run failed, continuing sweep"
                ),
            }
        }
        Ok(executed)
    }

    /// Execute one scenario right away, ignoring `enabled` and `next_run`.
    ///
    /// Returns `false` when no scenario with `id` exists.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn trigger_now(&self, id: ScenarioId) -> Result<bool, SceneHubError> {
        let Some(scenario) = self.scenarios.get(id).await? else {
            return Ok(false);
        };
        self.executor.execute(&scenario).await?;
        Ok(true)
    }

    /// Sweep every `period` until the task is aborted.
    pub async fn run_periodic(self: Arc<Self>, period: Duration) {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.check_and_run().await {
                Ok(executed) if executed.is_empty() => tracing::debug!("no scenarios due"),
                Ok(executed) => tracing::info!(?executed, "due scenarios executed"),
                Err(err) => tracing::error!(error = %err, "scenario sweep failed"),
            }
        }
    }
}
