//! Scheduler: the operations exposed to driving adapters, wired from one
//! store, one device-control capability, and one clock.

use std::sync::Arc;

use scenehub_domain::error::SceneHubError;
use scenehub_domain::id::ScenarioId;
use scenehub_domain::scenario::{Scenario, ScenarioPatch};
use scenehub_domain::scenario_log::ScenarioLog;

use crate::dispatcher::CommandDispatcher;
use crate::executor::ScenarioExecutor;
use crate::pending::{PendingAction, PendingActions};
use crate::ports::{Clock, DeviceControl, ScenarioStore};
use crate::services::scenario_service::ScenarioService;
use crate::sweeper::ScenarioSweeper;

/// Entry point for driving adapters.
///
/// Owns the scenario service, the sweeper and the pending-action registry,
/// all sharing one store, one device-control capability and one clock.
pub struct Scheduler<S, D, C> {
    scenarios: Arc<ScenarioService<S, C>>,
    sweeper: Arc<ScenarioSweeper<S, D, C>>,
    pending: Arc<PendingActions>,
    cancel_pending_on_delete: bool,
}

impl<S, D, C> Scheduler<S, D, C>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub fn new(store: S, control: D, clock: C) -> Self {
        let scenarios = Arc::new(ScenarioService::new(store, clock));
        let pending = Arc::new(PendingActions::new());
        let executor = Arc::new(ScenarioExecutor::new(
            Arc::clone(&scenarios),
            Arc::new(CommandDispatcher::new(control)),
            Arc::clone(&pending),
        ));
        let sweeper = Arc::new(ScenarioSweeper::new(Arc::clone(&scenarios), executor));
        Self {
            scenarios,
            sweeper,
            pending,
            cancel_pending_on_delete: false,
        }
    }

    /// Also abort a scenario's pending delayed actions when it is deleted.
    #[must_use]
    pub fn cancel_pending_on_delete(mut self, cancel: bool) -> Self {
        self.cancel_pending_on_delete = cancel;
        self
    }

    /// Sweeper handle, for driving [`ScenarioSweeper::run_periodic`].
    pub fn sweeper(&self) -> Arc<ScenarioSweeper<S, D, C>> {
        Arc::clone(&self.sweeper)
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list_scenarios(&self) -> Result<Vec<Scenario>, SceneHubError> {
        self.scenarios.list().await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn get_scenario(&self, id: ScenarioId) -> Result<Option<Scenario>, SceneHubError> {
        self.scenarios.get(id).await
    }

    /// # Errors
    ///
    /// Returns [`SceneHubError::Validation`] if invariants fail, or a
    /// storage error propagated from the store.
    pub async fn create_scenario(&self, scenario: Scenario) -> Result<Scenario, SceneHubError> {
        self.scenarios.create(scenario).await
    }

    /// # Errors
    ///
    /// Returns [`SceneHubError::Validation`] if the merged scenario is
    /// invalid, or a storage error propagated from the store.
    pub async fn update_scenario(
        &self,
        id: ScenarioId,
        patch: ScenarioPatch,
    ) -> Result<Option<Scenario>, SceneHubError> {
        self.scenarios.update(id, patch).await
    }

    /// Delete a scenario. Its pending delayed actions keep running unless
    /// the scheduler was built with [`Self::cancel_pending_on_delete`].
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn delete_scenario(&self, id: ScenarioId) -> Result<bool, SceneHubError> {
        let deleted = self.scenarios.delete(id).await?;
        if deleted && self.cancel_pending_on_delete {
            let cancelled = self.pending.cancel_for_scenario(id);
            if cancelled > 0 {
                tracing::info!(scenario_id = %id, cancelled, "pending actions cancelled");
            }
        }
        Ok(deleted)
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn toggle_scenario(&self, id: ScenarioId) -> Result<Option<Scenario>, SceneHubError> {
        self.scenarios.toggle(id).await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn trigger_scenario(&self, id: ScenarioId) -> Result<bool, SceneHubError> {
        self.sweeper.trigger_now(id).await
    }

    /// # Errors
    ///
    /// Returns a storage error if the scenario list cannot be loaded.
    pub async fn check_due_scenarios(&self) -> Result<Vec<String>, SceneHubError> {
        self.sweeper.check_and_run().await
    }

    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list_logs(&self) -> Result<Vec<ScenarioLog>, SceneHubError> {
        self.scenarios.list_logs().await
    }

    /// Delayed actions still waiting on their timer, soonest first.
    pub fn list_pending(&self) -> Vec<PendingAction> {
        self.pending.list()
    }

    /// Current time according to the scheduler's clock.
    pub fn now(&self) -> scenehub_domain::time::Timestamp {
        self.scenarios.now()
    }

    /// Abort every pending delayed action. Returns how many were dropped.
    pub fn shutdown(&self) -> usize {
        let dropped = self.pending.abort_all();
        if dropped > 0 {
            tracing::warn!(dropped, "pending delayed actions dropped on shutdown");
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{InMemoryScenarioStore, ManualClock, RecordingDeviceControl};
    use scenehub_domain::command::DeviceCommand;
    use scenehub_domain::scenario::ScenarioAction;
    use std::time::Duration;

    type TestScheduler =
        Scheduler<Arc<InMemoryScenarioStore>, Arc<RecordingDeviceControl>, Arc<ManualClock>>;

    fn make_scheduler() -> (TestScheduler, Arc<RecordingDeviceControl>) {
        let control = Arc::new(RecordingDeviceControl::default());
        let scheduler = Scheduler::new(
            Arc::new(InMemoryScenarioStore::default()),
            Arc::clone(&control),
            Arc::new(ManualClock::default()),
        );
        (scheduler, control)
    }

    fn with_delayed_action() -> Scenario {
        Scenario::builder()
            .name("Garden")
            .interval_hours(3.0)
            .action(ScenarioAction::delayed(
                "pump",
                "Pump",
                vec![DeviceCommand::new("switch_1", false)],
                10.0,
            ))
            .build()
            .unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_pending_actions_of_deleted_scenario_by_default() {
        let (scheduler, control) = make_scheduler();
        let scenario = scheduler.create_scenario(with_delayed_action()).await.unwrap();
        assert!(scheduler.trigger_scenario(scenario.id).await.unwrap());

        assert!(scheduler.delete_scenario(scenario.id).await.unwrap());
        assert_eq!(scheduler.list_pending().len(), 1);

        tokio::time::sleep(Duration::from_secs(11 * 60)).await;
        assert_eq!(control.calls().len(), 1);
        assert_eq!(scheduler.list_logs().await.unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn should_cancel_pending_actions_on_delete_when_configured() {
        let (scheduler, control) = make_scheduler();
        let scheduler = scheduler.cancel_pending_on_delete(true);
        let scenario = scheduler.create_scenario(with_delayed_action()).await.unwrap();
        scheduler.trigger_scenario(scenario.id).await.unwrap();

        scheduler.delete_scenario(scenario.id).await.unwrap();
        assert!(scheduler.list_pending().is_empty());

        tokio::time::sleep(Duration::from_secs(11 * 60)).await;
        assert!(control.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_drop_pending_actions_on_shutdown() {
        let (scheduler, control) = make_scheduler();
        let scenario = scheduler.create_scenario(with_delayed_action()).await.unwrap();
        scheduler.trigger_scenario(scenario.id).await.unwrap();

        assert_eq!(scheduler.shutdown(), 1);

        tokio::time::sleep(Duration::from_secs(11 * 60)).await;
        assert!(control.calls().is_empty());
        assert!(scheduler.list_pending().is_empty());
    }

    #[tokio::test]
    async fn should_toggle_twice_back_to_original_state() {
        let (scheduler, _) = make_scheduler();
        let scenario = scheduler.create_scenario(with_delayed_action()).await.unwrap();

        let once = scheduler.toggle_scenario(scenario.id).await.unwrap().unwrap();
        let twice = scheduler.toggle_scenario(scenario.id).await.unwrap().unwrap();

        assert_ne!(once.enabled, scenario.enabled);
        assert_eq!(twice.enabled, scenario.enabled);
        assert!(twice.next_run.unwrap() >= scheduler.now());
    }
}
