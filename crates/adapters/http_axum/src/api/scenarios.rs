//! JSON REST handlers for scenarios.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use scenehub_app::pending::PendingAction;
use scenehub_app::ports::{Clock, DeviceControl, ScenarioStore};
use scenehub_domain::id::ScenarioId;
use scenehub_domain::scenario::{Scenario, ScenarioAction, ScenarioPatch};
use scenehub_domain::scenario_log::ScenarioLog;
use scenehub_domain::time::{Timestamp, iso_millis};

use crate::error::{ApiError, ErrorBody};
use crate::state::AppState;

const NOT_FOUND: &str = "scenario not found";

/// Request body for creating a scenario.
///
/// Omitted fields take the dashboard's defaults: enabled, no description,
/// zero duration, no actions.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateScenarioRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub enabled: Option<bool>,
    #[serde(default)]
    pub interval_hours: f64,
    #[serde(default)]
    pub duration_minutes: f64,
    #[serde(default)]
    pub actions: Vec<ScenarioAction>,
}

/// Request body for `PATCH /api/scenarios/{id}`.
#[derive(Deserialize)]
pub struct ScenarioActionRequest {
    pub action: String,
}

/// Scenarios together with the run log.
#[derive(Serialize)]
pub struct Overview {
    pub scenarios: Vec<Scenario>,
    pub logs: Vec<ScenarioLog>,
}

/// Outcome of a due-scenario sweep.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub executed: Vec<String>,
    #[serde(with = "iso_millis")]
    pub checked_at: Timestamp,
}

#[derive(Serialize)]
struct Triggered {
    triggered: bool,
}

/// Possible responses from endpoints addressing one scenario.
pub enum ScenarioResponse {
    Ok(Json<Scenario>),
    NotFound,
}

impl IntoResponse for ScenarioResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
            Self::NotFound => ErrorBody::response(StatusCode::NOT_FOUND, NOT_FOUND),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Scenario>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the patch endpoint.
pub enum ActionResponse {
    Toggled(Json<Scenario>),
    Triggered,
    NotFound,
    InvalidAction,
}

impl IntoResponse for ActionResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Toggled(json) => json.into_response(),
            Self::Triggered => Json(Triggered { triggered: true }).into_response(),
            Self::NotFound => ErrorBody::response(StatusCode::NOT_FOUND, NOT_FOUND),
            Self::InvalidAction => {
                ErrorBody::response(StatusCode::BAD_REQUEST, "action must be `toggle` or `trigger`")
            }
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
    NotFound,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
            Self::NotFound => ErrorBody::response(StatusCode::NOT_FOUND, NOT_FOUND),
        }
    }
}

/// An id that does not parse cannot name an existing scenario.
fn parse_id(raw: &str) -> Option<ScenarioId> {
    ScenarioId::from_str(raw).ok()
}

/// `GET /api/scenarios`: all scenarios and the run log.
pub async fn list<S, D, C>(
    State(state): State<AppState<S, D, C>>,
) -> Result<Json<Overview>, ApiError>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    let scenarios = state.scheduler.list_scenarios().await?;
    let logs = state.scheduler.list_logs().await?;
    Ok(Json(Overview { scenarios, logs }))
}

/// `POST /api/scenarios`: create a new scenario.
pub async fn create<S, D, C>(
    State(state): State<AppState<S, D, C>>,
    Json(req): Json<CreateScenarioRequest>,
) -> Result<CreateResponse, ApiError>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    let scenario = Scenario::builder()
        .name(req.name)
        .description(req.description)
        .enabled(req.enabled.unwrap_or(true))
        .interval_hours(req.interval_hours)
        .duration_minutes(req.duration_minutes)
        .actions(req.actions)
        .created_at(state.scheduler.now())
        .build()?;
    let created = state.scheduler.create_scenario(scenario).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `GET /api/scenarios/logs`: run log, newest first.
pub async fn logs<S, D, C>(
    State(state): State<AppState<S, D, C>>,
) -> Result<Json<Vec<ScenarioLog>>, ApiError>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    Ok(Json(state.scheduler.list_logs().await?))
}

/// `GET /api/scenarios/pending`: delayed actions waiting on their timer.
pub async fn pending<S, D, C>(State(state): State<AppState<S, D, C>>) -> Json<Vec<PendingAction>>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    Json(state.scheduler.list_pending())
}

/// `POST /api/scenarios/check`: run every due scenario now.
pub async fn check<S, D, C>(
    State(state): State<AppState<S, D, C>>,
) -> Result<Json<CheckResult>, ApiError>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    let executed = state.scheduler.check_due_scenarios().await?;
    Ok(Json(CheckResult {
        executed,
        checked_at: state.scheduler.now(),
    }))
}

/// `GET /api/scenarios/{id}`: get one scenario.
pub async fn get<S, D, C>(
    State(state): State<AppState<S, D, C>>,
    Path(id): Path<String>,
) -> Result<ScenarioResponse, ApiError>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    let Some(id) = parse_id(&id) else {
        return Ok(ScenarioResponse::NotFound);
    };
    Ok(match state.scheduler.get_scenario(id).await? {
        Some(scenario) => ScenarioResponse::Ok(Json(scenario)),
        None => ScenarioResponse::NotFound,
    })
}

/// `PUT /api/scenarios/{id}`: merge the given fields into a scenario.
pub async fn update<S, D, C>(
    State(state): State<AppState<S, D, C>>,
    Path(id): Path<String>,
    Json(patch): Json<ScenarioPatch>,
) -> Result<ScenarioResponse, ApiError>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    let Some(id) = parse_id(&id) else {
        return Ok(ScenarioResponse::NotFound);
    };
    Ok(match state.scheduler.update_scenario(id, patch).await? {
        Some(scenario) => ScenarioResponse::Ok(Json(scenario)),
        None => ScenarioResponse::NotFound,
    })
}

/// `PATCH /api/scenarios/{id}`: `{"action": "toggle"}` or `{"action": "trigger"}`.
pub async fn act<S, D, C>(
    State(state): State<AppState<S, D, C>>,
    Path(id): Path<String>,
    Json(req): Json<ScenarioActionRequest>,
) -> Result<ActionResponse, ApiError>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    let action = req.action.as_str();
    if !matches!(action, "toggle" | "trigger") {
        return Ok(ActionResponse::InvalidAction);
    }
    let Some(id) = parse_id(&id) else {
        return Ok(ActionResponse::NotFound);
    };
    if action == "toggle" {
        return Ok(match state.scheduler.toggle_scenario(id).await? {
            Some(scenario) => ActionResponse::Toggled(Json(scenario)),
            None => ActionResponse::NotFound,
        });
    }
    Ok(if state.scheduler.trigger_scenario(id).await? {
        ActionResponse::Triggered
    } else {
        ActionResponse::NotFound
    })
}

/// `DELETE /api/scenarios/{id}`: delete a scenario.
pub async fn delete<S, D, C>(
    State(state): State<AppState<S, D, C>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    S: ScenarioStore + Send + Sync + 'static,
    D: DeviceControl + Send + Sync + 'static,
    C: Clock + 'static,
{
    let Some(id) = parse_id(&id) else {
        return Ok(DeleteResponse::NotFound);
    };
    Ok(if state.scheduler.delete_scenario(id).await? {
        DeleteResponse::NoContent
    } else {
        DeleteResponse::NotFound
    })
}
