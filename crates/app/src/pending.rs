//! Registry of delayed actions waiting on their timer.
//!
//! Each delayed action runs as its own tokio task. The registry keeps the
//! task's abort handle next to a description of what it will do, so pending
//! work can be listed and cancelled. A task removes its own entry once it has
//! dispatched and logged.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::task::AbortHandle;

use scenehub_domain::id::{PendingActionId, ScenarioId};
use scenehub_domain::time::{Timestamp, iso_millis};

/// What a pending delayed action will do, and when.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingAction {
    pub id: PendingActionId,
    pub scenario_id: ScenarioId,
    pub scenario_name: String,
    pub device_name: String,
    #[serde(with = "iso_millis")]
    pub due_at: Timestamp,
}

struct Entry {
    action: PendingAction,
    handle: AbortHandle,
}

/// Timer handles of every delayed action that has not fired yet.
#[derive(Default)]
pub struct PendingActions {
    tasks: Mutex<HashMap<PendingActionId, Entry>>,
}

impl PendingActions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn `task` and track it under `action.id` until it completes.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(self: &Arc<Self>, action: PendingAction, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let id = action.id;
        let registry = Arc::clone(self);
        // Held across spawn + insert so a task finishing immediately cannot
        // remove its entry before it exists.
        let mut tasks = self.lock();
        let handle = tokio::spawn(async move {
            task.await;
            registry.lock().remove(&id);
        });
        tasks.insert(
            id,
            Entry {
                action,
                handle: handle.abort_handle(),
            },
        );
    }

    /// Snapshot of pending actions, soonest first.
    #[must_use]
    pub fn list(&self) -> Vec<PendingAction> {
        let mut actions: Vec<_> = self.lock().values().map(|e| e.action.clone()).collect();
        actions.sort_by_key(|a| a.due_at);
        actions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Abort every pending action of one scenario. Returns how many were dropped.
    pub fn cancel_for_scenario(&self, scenario_id: ScenarioId) -> usize {
        let mut tasks = self.lock();
        let cancelled: Vec<_> = tasks
            .iter()
            .filter(|(_, e)| e.action.scenario_id == scenario_id)
            .map(|(id, _)| *id)
            .collect();
        for id in &cancelled {
            if let Some(entry) = tasks.remove(id) {
                entry.handle.abort();
            }
        }
        cancelled.len()
    }

    /// Abort everything. Returns how many actions were dropped.
    pub fn abort_all(&self) -> usize {
        let drained: Vec<_> = self.lock().drain().collect();
        for (_, entry) in &drained {
            entry.handle.abort();
        }
        drained.len()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PendingActionId, Entry>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{t0, t0_plus_minutes};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn pending(scenario_id: ScenarioId, due_at: Timestamp) -> PendingAction {
        PendingAction {
            id: PendingActionId::new(),
            scenario_id,
            scenario_name: "Garden".to_string(),
            device_name: "Pump".to_string(),
            due_at,
        }
    }

    async fn wait_until_empty(registry: &PendingActions) {
        while !registry.is_empty() {
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn should_remove_entry_when_task_completes() {
        let registry = Arc::new(PendingActions::new());
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        registry.spawn(pending(ScenarioId::new(), t0()), async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
        });
        assert_eq!(registry.len(), 1);

        wait_until_empty(&registry).await;
        assert!(fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn should_list_soonest_first() {
        let registry = Arc::new(PendingActions::new());
        let scenario_id = ScenarioId::new();
        registry.spawn(pending(scenario_id, t0_plus_minutes(30)), std::future::pending());
        registry.spawn(pending(scenario_id, t0_plus_minutes(5)), std::future::pending());

        let due: Vec<_> = registry.list().into_iter().map(|a| a.due_at).collect();
        assert_eq!(due, [t0_plus_minutes(5), t0_plus_minutes(30)]);
        registry.abort_all();
    }

    #[tokio::test(start_paused = true)]
    async fn should_cancel_only_actions_of_given_scenario() {
        let registry = Arc::new(PendingActions::new());
        let doomed = ScenarioId::new();
        let kept = ScenarioId::new();
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        registry.spawn(pending(doomed, t0()), async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
        });
        registry.spawn(pending(kept, t0()), std::future::pending());

        assert_eq!(registry.cancel_for_scenario(doomed), 1);
        assert_eq!(registry.len(), 1);

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!fired.load(Ordering::SeqCst));
        assert_eq!(registry.abort_all(), 1);
        assert!(registry.is_empty());
    }
}
