//! Shared application state for axum handlers.

use std::sync::Arc;

use scenehub_app::ports::{Clock, DeviceControl, ScenarioStore};
use scenehub_app::scheduler::Scheduler;

/// Application state shared across all axum handlers.
///
/// Generic over the store, device control, and clock to avoid dynamic
/// dispatch. `Clone` is implemented manually so the underlying types
/// themselves do not need to be `Clone`; only the `Arc` is cloned.
pub struct AppState<S, D, C> {
    pub scheduler: Arc<Scheduler<S, D, C>>,
}

impl<S, D, C> Clone for AppState<S, D, C> {
    fn clone(&self) -> Self {
        Self {
            scheduler: Arc::clone(&self.scheduler),
        }
    }
}

impl<S, D, C> AppState<S, D, C>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    /// Create the state from a scheduler already shared with background tasks.
    pub fn new(scheduler: Arc<Scheduler<S, D, C>>) -> Self {
        Self { scheduler }
    }
}
