//! Scenario service: the repository use-cases over a [`ScenarioStore`].
//!
//! Every mutation is a read-modify-write of the whole collection, so all of
//! them go through one writer lock.

use scenehub_domain::error::SceneHubError;
use scenehub_domain::id::ScenarioId;
use scenehub_domain::scenario::{Scenario, ScenarioPatch};
use scenehub_domain::scenario_log::ScenarioLog;
use scenehub_domain::time::Timestamp;
use tokio::sync::Mutex;

use crate::ports::{Clock, ScenarioStore};

/// Application service owning all reads and writes of scenarios and logs.
pub struct ScenarioService<S, C> {
    store: S,
    clock: C,
    writer: Mutex<()>,
}

impl<S, C> ScenarioService<S, C>
where
    S: ScenarioStore + Send + Sync,
    C: Clock,
{
    /// Create a new service backed by the given store and clock.
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            writer: Mutex::new(()),
        }
    }

    /// Current time according to the injected clock.
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// List all scenarios in insertion order.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list(&self) -> Result<Vec<Scenario>, SceneHubError> {
        self.store.load().await
    }

    /// Look up a scenario by id.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn get(&self, id: ScenarioId) -> Result<Option<Scenario>, SceneHubError> {
        Ok(self.store.load().await?.into_iter().find(|s| s.id == id))
    }

    /// Validate, schedule, and append a new scenario.
    ///
    /// `next_run` is set one interval from now even when the scenario is
    /// created disabled.
    ///
    /// # Errors
    ///
    /// Returns [`SceneHubError::Validation`] if invariants fail, or a
    /// storage error propagated from the store.
    #[tracing::instrument(skip(self, scenario), fields(scenario_name = %scenario.name))]
    pub async fn create(&self, mut scenario: Scenario) -> Result<Scenario, SceneHubError> {
        scenario.validate()?;
        scenario.reschedule(self.clock.now());

        let _guard = self.writer.lock().await;
        let mut scenarios = self.store.load().await?;
        scenarios.push(scenario.clone());
        self.store.save(&scenarios).await?;
        tracing::info!(scenario_id = %scenario.id, "scenario created");
        Ok(scenario)
    }

    /// Shallow-merge `patch` over the stored scenario.
    ///
    /// Returns `None` when no scenario with `id` exists.
    ///
    /// # Errors
    ///
    /// Returns [`SceneHubError::Validation`] if the merged scenario is
    /// invalid (nothing is written), or a storage error from the store.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: ScenarioId,
        patch: ScenarioPatch,
    ) -> Result<Option<Scenario>, SceneHubError> {
        self.modify(id, |scenario, now| {
            scenario.apply(patch, now);
            scenario.validate()
        })
        .await
    }

    /// Flip `enabled`, rescheduling from now when it becomes `true`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self))]
    pub async fn toggle(&self, id: ScenarioId) -> Result<Option<Scenario>, SceneHubError> {
        self.modify(id, |scenario, now| {
            scenario.toggle(now);
            Ok(())
        })
        .await
    }

    /// Remove a scenario. Returns `false` when it did not exist.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: ScenarioId) -> Result<bool, SceneHubError> {
        let _guard = self.writer.lock().await;
        let mut scenarios = self.store.load().await?;
        let before = scenarios.len();
        scenarios.retain(|s| s.id != id);
        if scenarios.len() == before {
            return Ok(false);
        }
        self.store.save(&scenarios).await?;
        Ok(true)
    }

    /// Stamp `last_run` with the current time and schedule the next run.
    ///
    /// A scenario deleted in the meantime is left alone and `None` is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    #[tracing::instrument(skip(self))]
    pub async fn record_run(&self, id: ScenarioId) -> Result<Option<Scenario>, SceneHubError> {
        let updated = self
            .modify(id, |scenario, now| {
                scenario.mark_run(now);
                Ok(())
            })
            .await?;
        if updated.is_none() {
            tracing::debug!("scenario removed before its run was recorded");
        }
        Ok(updated)
    }

    /// List run logs, newest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn list_logs(&self) -> Result<Vec<ScenarioLog>, SceneHubError> {
        self.store.load_logs().await
    }

    /// Append one run log entry.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the store.
    pub async fn append_log(&self, log: ScenarioLog) -> Result<(), SceneHubError> {
        let _guard = self.writer.lock().await;
        self.store.append_log(log).await
    }

    async fn modify<F>(&self, id: ScenarioId, change: F) -> Result<Option<Scenario>, SceneHubError>
    where
        F: FnOnce(&mut Scenario, Timestamp) -> Result<(), SceneHubError> + Send,
    {
        let _guard = self.writer.lock().await;
        let mut scenarios = self.store.load().await?;
        let Some(scenario) = scenarios.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        change(scenario, self.clock.now())?;
        let updated = scenario.clone();
        self.store.save(&scenarios).await?;
        Ok(Some(updated))
    }
}
