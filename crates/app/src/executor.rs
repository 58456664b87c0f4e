//! Scenario executor: runs one scenario: immediate actions in order, delayed
//! actions on their own timers, then records the run.

use std::sync::Arc;

use tracing::Instrument;

use scenehub_domain::error::SceneHubError;
use scenehub_domain::id::{PendingActionId, ScenarioId};
use scenehub_domain::scenario::{ActionPhase, Scenario, ScenarioAction};
use scenehub_domain::scenario_log::ScenarioLog;
use scenehub_domain::time;

use crate::dispatcher::CommandDispatcher;
use crate::pending::{PendingAction, PendingActions};
use crate::ports::{Clock, DeviceControl, ScenarioStore};
use crate::services::scenario_service::ScenarioService;

/// Summary of one execution, available as soon as the immediate phase is done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub scenario_id: ScenarioId,
    pub succeeded: usize,
    pub failed: usize,
    /// Delayed actions handed to the timer registry.
    pub scheduled: Vec<PendingActionId>,
    /// `false` when the scenario was deleted before its run could be stamped.
    pub recorded: bool,
}

/// Executes scenarios against a device-control capability.
pub struct ScenarioExecutor<S, D, C> {
    scenarios: Arc<ScenarioService<S, C>>,
    dispatcher: Arc<CommandDispatcher<D>>,
    pending: Arc<PendingActions>,
}

impl<S, D, C> ScenarioExecutor<S, D, C>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    pub fn new(
        scenarios: Arc<ScenarioService<S, C>>,
        dispatcher: Arc<CommandDispatcher<D>>,
        pending: Arc<PendingActions>,
    ) -> Self {
        Self {
            scenarios,
            dispatcher,
            pending,
        }
    }

    /// Run `scenario` once.
    ///
    /// Immediate actions are dispatched sequentially in declared order and
    /// each outcome is logged; a failure never stops the next action.
    /// Delayed actions are registered and the call returns without waiting
    /// for them. Finally `last_run`/`next_run` are stamped on the stored copy.
    ///
    /// The run happens on its own task. Dropping the returned future does
    /// not stop it halfway: every immediate action is still dispatched and
    /// logged, and the run is still recorded.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the run cannot be recorded, or
    /// [`SceneHubError::Interrupted`] if the runtime shut down underneath it.
    /// Failed log writes are reported through `tracing` only.
    #[tracing::instrument(skip(self, scenario), fields(scenario_id = %scenario.id, scenario_name = %scenario.name))]
    pub async fn execute(
        self: &Arc<Self>,
        scenario: &Scenario,
    ) -> Result<ExecutionReport, SceneHubError> {
        let executor = Arc::clone(self);
        let scenario = scenario.clone();
        let run = tokio::spawn(async move { executor.run(&scenario).await }.in_current_span());
        match run.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => Err(SceneHubError::Interrupted(Box::new(err))),
        }
    }

    async fn run(&self, scenario: &Scenario) -> Result<ExecutionReport, SceneHubError> {
        let mut report = ExecutionReport {
            scenario_id: scenario.id,
            succeeded: 0,
            failed: 0,
            scheduled: Vec::new(),
            recorded: false,
        };

        for action in scenario.actions_in(ActionPhase::Immediate) {
            let result = self
                .dispatcher
                .dispatch(&action.device_id, &action.commands)
                .await;
            if result.success {
                report.succeeded += 1;
            } else {
                report.failed += 1;
            }
            let log = ScenarioLog::for_action(
                scenario.id,
                &scenario.name,
                action,
                ActionPhase::Immediate,
                &result,
                self.scenarios.now(),
            );
            if let Err(err) = self.scenarios.append_log(log).await {
                tracing::error!(error = %err, device_id = %action.device_id, "failed to append scenario log");
            }
        }

        for action in scenario.actions_in(ActionPhase::Delayed) {
            report.scheduled.push(self.schedule_delayed(scenario, action.clone()));
        }

        report.recorded = self.scenarios.record_run(scenario.id).await?.is_some();
        tracing::info!(
            succeeded = report.succeeded,
            failed = report.failed,
            scheduled = report.scheduled.len(),
            "scenario executed"
        );
        Ok(report)
    }

    fn schedule_delayed(&self, scenario: &Scenario, action: ScenarioAction) -> PendingActionId {
        let id = PendingActionId::new();
        let due_at = time::add_hours(self.scenarios.now(), action.delay_minutes / 60.0);
        let pending = PendingAction {
            id,
            scenario_id: scenario.id,
            scenario_name: scenario.name.clone(),
            device_name: action.device_name.clone(),
            due_at,
        };

        let scenarios = Arc::clone(&self.scenarios);
        let dispatcher = Arc::clone(&self.dispatcher);
        let scenario_id = scenario.id;
        let scenario_name = scenario.name.clone();
        tracing::debug!(
            device_id = %action.device_id,
            delay_minutes = action.delay_minutes,
            "delayed action scheduled"
        );

        self.pending.spawn(pending, async move {
            tokio::time::sleep(action.delay()).await;
            let result = dispatcher
                .dispatch(&action.device_id, &action.commands)
                .await;
            let log = ScenarioLog::for_action(
                scenario_id,
                scenario_name,
                &action,
                ActionPhase::Delayed,
                &result,
                scenarios.now(),
            );
            if let Err(err) = scenarios.append_log(log).await {
                tracing::error!(
                    error = %err,
                    %scenario_id,
                    device_id = %action.device_id,
                    "failed to append delayed action log"
                );
            }
        });
        id
    }
}
