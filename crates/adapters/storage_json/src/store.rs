//! JSON file implementation of [`ScenarioStore`].

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use scenehub_app::ports::ScenarioStore;
use scenehub_domain::error::SceneHubError;
use scenehub_domain::scenario::Scenario;
use scenehub_domain::scenario_log::{self, MAX_LOGS, ScenarioLog};

use crate::document::{CURRENT_VERSION, LogsDocument, LogsOut, ScenariosDocument, ScenariosOut};
use crate::error::StorageError;

pub const SCENARIOS_FILE: &str = "scenarios.json";
pub const LOGS_FILE: &str = "scenario-logs.json";

/// Scenario store keeping one JSON document per collection.
///
/// Not safe for concurrent writers on its own: callers serialize mutations
/// (the scenario service holds a writer lock).
pub struct JsonFileStore {
    scenarios_path: PathBuf,
    logs_path: PathBuf,
}

impl JsonFileStore {
    /// Store files inside `dir`, which must already exist.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            scenarios_path: dir.join(SCENARIOS_FILE),
            logs_path: dir.join(LOGS_FILE),
        }
    }

    /// Create `dir` if needed and store files inside it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the directory cannot be created.
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self, StorageError> {
        tokio::fs::create_dir_all(dir.as_ref()).await?;
        Ok(Self::new(dir))
    }

    #[must_use]
    pub fn scenarios_path(&self) -> &Path {
        &self.scenarios_path
    }

    #[must_use]
    pub fn logs_path(&self) -> &Path {
        &self.logs_path
    }

    async fn read_scenarios(&self) -> Result<Vec<Scenario>, StorageError> {
        let Some(document) = read_document::<ScenariosDocument>(&self.scenarios_path).await? else {
            return Ok(Vec::new());
        };
        warn_if_newer(&self.scenarios_path, document.version());
        Ok(document.into_scenarios())
    }

    async fn read_logs(&self) -> Result<Vec<ScenarioLog>, StorageError> {
        let Some(document) = read_document::<LogsDocument>(&self.logs_path).await? else {
            return Ok(Vec::new());
        };
        warn_if_newer(&self.logs_path, document.version());
        Ok(document.into_logs())
    }
}

impl ScenarioStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<Scenario>, SceneHubError> {
        Ok(self.read_scenarios().await?)
    }

    async fn save(&self, scenarios: &[Scenario]) -> Result<(), SceneHubError> {
        let document = ScenariosOut {
            version: CURRENT_VERSION,
            scenarios,
        };
        write_document(&self.scenarios_path, &document).await?;
        Ok(())
    }

    async fn load_logs(&self) -> Result<Vec<ScenarioLog>, SceneHubError> {
        Ok(self.read_logs().await?)
    }

    async fn append_log(&self, log: ScenarioLog) -> Result<(), SceneHubError> {
        let mut logs = self.read_logs().await?;
        scenario_log::push_capped(&mut logs, log, MAX_LOGS);
        let document = LogsOut {
            version: CURRENT_VERSION,
            logs: &logs,
        };
        write_document(&self.logs_path, &document).await?;
        Ok(())
    }
}

/// Read and parse `path`.
///
/// A missing or blank file is `None`. A file that does not parse is renamed
/// to `<file>.corrupt` and also reads as `None`.
async fn read_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StorageError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    match serde_json::from_slice(&bytes) {
        Ok(document) => Ok(Some(document)),
        Err(err) => {
            let quarantine = with_suffix(path, "corrupt");
            tokio::fs::rename(path, &quarantine).await?;
            tracing::warn!(
                path = %path.display(),
                quarantine = %quarantine.display(),
                error = %err,
                "unreadable store file moved aside, starting empty"
            );
            Ok(None)
        }
    }
}

async fn write_document<T: Serialize>(path: &Path, document: &T) -> Result<(), StorageError> {
    let mut bytes = serde_json::to_vec_pretty(document)?;
    bytes.push(b'\n');
    let tmp = with_suffix(path, "tmp");
    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn warn_if_newer(path: &Path, version: u32) {
    if version > CURRENT_VERSION {
        tracing::warn!(
            path = %path.display(),
            version,
            supported = CURRENT_VERSION,
            "store file written by a newer version"
        );
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
