//! `SQLite` implementation of [`ScenarioStore`].

use std::str::FromStr;

use chrono::SecondsFormat;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use scenehub_app::ports::ScenarioStore;
use scenehub_domain::error::SceneHubError;
use scenehub_domain::id::{ScenarioId, ScenarioLogId};
use scenehub_domain::scenario::{Scenario, ScenarioAction};
use scenehub_domain::scenario_log::{MAX_LOGS, ScenarioLog};
use scenehub_domain::time::Timestamp;

use crate::error::StorageError;

struct ScenarioRow(Scenario);

impl<'r> FromRow<'r, SqliteRow> for ScenarioRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let actions_json: String = row.try_get("actions")?;
        let last_run: Option<String> = row.try_get("last_run")?;
        let next_run: Option<String> = row.try_get("next_run")?;
        let created_at: String = row.try_get("created_at")?;

        let actions: Vec<ScenarioAction> = serde_json::from_str(&actions_json)
            .map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Scenario {
            id: ScenarioId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            enabled: row.try_get("enabled")?,
            interval_hours: row.try_get("interval_hours")?,
            duration_minutes: row.try_get("duration_minutes")?,
            actions,
            last_run: last_run.as_deref().map(parse_timestamp).transpose()?,
            next_run: next_run.as_deref().map(parse_timestamp).transpose()?,
            created_at: parse_timestamp(&created_at)?,
        }))
    }
}

struct LogRow(ScenarioLog);

impl<'r> FromRow<'r, SqliteRow> for LogRow {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let scenario_id: String = row.try_get("scenario_id")?;
        let timestamp: String = row.try_get("timestamp")?;

        Ok(Self(ScenarioLog {
            id: ScenarioLogId::from_str(&id).map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            scenario_id: ScenarioId::from_str(&scenario_id)
                .map_err(|err| sqlx::Error::Decode(Box::new(err)))?,
            scenario_name: row.try_get("scenario_name")?,
            action: row.try_get("action")?,
            timestamp: parse_timestamp(&timestamp)?,
            success: row.try_get("success")?,
            message: row.try_get("message")?,
        }))
    }
}

fn parse_timestamp(raw: &str) -> Result<Timestamp, sqlx::Error> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.to_utc())
        .map_err(|err| sqlx::Error::Decode(Box::new(err)))
}

fn format_timestamp(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Decode rows one by one, skipping the ones that no longer decode.
fn decode_rows<T>(rows: &[SqliteRow], table: &str) -> Vec<T>
where
    T: for<'r> FromRow<'r, SqliteRow>,
{
    rows.iter()
        .filter_map(|row| match T::from_row(row) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(table, error = %err, "skipping undecodable row");
                None
            }
        })
        .collect()
}

/// `SQLite`-backed scenario store.
pub struct SqliteScenarioStore {
    pool: SqlitePool,
}

impl SqliteScenarioStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ScenarioStore for SqliteScenarioStore {
    async fn load(&self) -> Result<Vec<Scenario>, SceneHubError> {
        let rows = sqlx::query("SELECT * FROM scenarios ORDER BY position")
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(decode_rows::<ScenarioRow>(&rows, "scenarios")
            .into_iter()
            .map(|r| r.0)
            .collect())
    }

    /// Replace every decodable row with `scenarios`.
    ///
    /// Rows that `load` skips are left untouched so a later fix can still
    /// recover them.
    async fn save(&self, scenarios: &[Scenario]) -> Result<(), SceneHubError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        let rows = sqlx::query("SELECT * FROM scenarios")
            .fetch_all(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        for row in &rows {
            if ScenarioRow::from_row(row).is_err() {
                continue;
            }
            let id: String = row.try_get("id").map_err(StorageError::from)?;
            sqlx::query("DELETE FROM scenarios WHERE id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(StorageError::from)?;
        }

        for (position, scenario) in (0_i64..).zip(scenarios) {
            let actions_json =
                serde_json::to_string(&scenario.actions).map_err(StorageError::from)?;
            sqlx::query(
                "INSERT OR REPLACE INTO scenarios (position, id, name, description, enabled, interval_hours, duration_minutes, actions, last_run, next_run, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(position)
            .bind(scenario.id.to_string())
            .bind(&scenario.name)
            .bind(&scenario.description)
            .bind(scenario.enabled)
            .bind(scenario.interval_hours)
            .bind(scenario.duration_minutes)
            .bind(&actions_json)
            .bind(scenario.last_run.map(format_timestamp))
            .bind(scenario.next_run.map(format_timestamp))
            .bind(format_timestamp(scenario.created_at))
            .execute(&mut *tx)
            .await
            .map_err(StorageError::from)?;
        }

        tx.commit().await.map_err(StorageError::from)?;
        Ok(())
    }

    async fn load_logs(&self) -> Result<Vec<ScenarioLog>, SceneHubError> {
        let rows = sqlx::query("SELECT * FROM scenario_logs ORDER BY seq DESC LIMIT ?")
            .bind(i64::try_from(MAX_LOGS).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(decode_rows::<LogRow>(&rows, "scenario_logs")
            .into_iter()
            .map(|r| r.0)
            .collect())
    }

    async fn append_log(&self, log: ScenarioLog) -> Result<(), SceneHubError> {
        let mut tx = self.pool.begin().await.map_err(StorageError::from)?;

        sqlx::query(
            "INSERT INTO scenario_logs (id, scenario_id, scenario_name, action, timestamp, success, message) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(log.id.to_string())
        .bind(log.scenario_id.to_string())
        .bind(&log.scenario_name)
        .bind(&log.action)
        .bind(format_timestamp(log.timestamp))
        .bind(log.success)
        .bind(&log.message)
        .execute(&mut *tx)
        .await
        .map_err(StorageError::from)?;

        sqlx::query(
            "DELETE FROM scenario_logs WHERE seq NOT IN (SELECT seq FROM scenario_logs ORDER BY seq DESC LIMIT ?)",
        )
        .bind(i64::try_from(MAX_LOGS).unwrap_or(i64::MAX))
        .execute(&mut *tx)
        .await
        .map_err(StorageError::from)?;

        tx.commit().await.map_err(StorageError::from)?;
        Ok(())
    }
}
