//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod scenarios;

use axum::Router;
use axum::routing::{get, post};

use scenehub_app::ports::{Clock, DeviceControl, ScenarioStore};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<S, D, C>() -> Router<AppState<S, D, C>>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route(
            "/scenarios",
            get(scenarios::list::<S, D, C>).post(scenarios::create::<S, D, C>),
        )
        .route("/scenarios/logs", get(scenarios::logs::<S, D, C>))
        .route("/scenarios/pending", get(scenarios::pending::<S, D, C>))
        .route("/scenarios/check", post(scenarios::check::<S, D, C>))
        .route(
            "/scenarios/{id}",
            get(scenarios::get::<S, D, C>)
                .put(scenarios::update::<S, D, C>)
                .patch(scenarios::act::<S, D, C>)
                .delete(scenarios::delete::<S, D, C>),
        )
}
