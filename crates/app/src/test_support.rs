//! Test doubles shared by the service, executor, and sweeper tests.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use chrono::TimeZone;
use scenehub_domain::command::{CommandResult, DeviceCommand};
use scenehub_domain::error::SceneHubError;
use scenehub_domain::scenario::Scenario;
use scenehub_domain::scenario_log::{self, MAX_LOGS, ScenarioLog};
use scenehub_domain::time::Timestamp;

use crate::ports::{Clock, DeviceControl, ScenarioStore};

/// Store keeping both collections in memory.
#[derive(Default)]
pub struct InMemoryScenarioStore {
    scenarios: Mutex<Vec<Scenario>>,
    logs: Mutex<Vec<ScenarioLog>>,
}

impl InMemoryScenarioStore {
    pub fn with(scenarios: Vec<Scenario>) -> Self {
        Self {
            scenarios: Mutex::new(scenarios),
            logs: Mutex::new(Vec::new()),
        }
    }

    pub fn stored(&self) -> Vec<Scenario> {
        self.scenarios.lock().unwrap().clone()
    }
}

impl ScenarioStore for InMemoryScenarioStore {
    fn load(&self) -> impl Future<Output = Result<Vec<Scenario>, SceneHubError>> + Send {
        let result = self.scenarios.lock().unwrap().clone();
        async { Ok(result) }
    }

    fn save(
        &self,
        scenarios: &[Scenario],
    ) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        *self.scenarios.lock().unwrap() = scenarios.to_vec();
        async { Ok(()) }
    }

    fn load_logs(&self) -> impl Future<Output = Result<Vec<ScenarioLog>, SceneHubError>> + Send {
        let result = self.logs.lock().unwrap().clone();
        async { Ok(result) }
    }

    fn append_log(&self, log: ScenarioLog) -> impl Future<Output = Result<(), SceneHubError>> + Send {
        scenario_log::push_capped(&mut self.logs.lock().unwrap(), log, MAX_LOGS);
        async { Ok(()) }
    }
}

/// Device control that records every call and fails for chosen devices.
#[derive(Default)]
pub struct RecordingDeviceControl {
    calls: Mutex<Vec<(String, Vec<DeviceCommand>)>>,
    refusing: HashSet<String>,
    unreachable: HashSet<String>,
    stalling: HashSet<String>,
    stall: Duration,
}

impl RecordingDeviceControl {
    /// Devices in `ids` answer with a failed result.
    pub fn refusing(ids: &[&str]) -> Self {
        Self {
            refusing: ids.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    /// Devices in `ids` fail at the transport level.
    pub fn unreachable(ids: &[&str]) -> Self {
        Self {
            unreachable: ids.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    /// Devices in `ids` take `stall` to answer. The call is recorded first.
    pub fn stalling(ids: &[&str], stall: Duration) -> Self {
        Self {
            stalling: ids.iter().map(ToString::to_string).collect(),
            stall,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(String, Vec<DeviceCommand>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_devices(&self) -> Vec<String> {
        self.calls().into_iter().map(|(id, _)| id).collect()
    }
}

impl DeviceControl for RecordingDeviceControl {
    fn send_commands(
        &self,
        device_id: &str,
        commands: &[DeviceCommand],
    ) -> impl Future<Output = Result<CommandResult, SceneHubError>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push((device_id.to_string(), commands.to_vec()));
        let result = if self.unreachable.contains(device_id) {
            Err(SceneHubError::DeviceControl(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            ))))
        } else if self.refusing.contains(device_id) {
            Ok(CommandResult::failure("device offline"))
        } else {
            Ok(CommandResult::ok())
        };
        let stall = self
            .stalling
            .contains(device_id)
            .then_some(self.stall);
        async move {
            if let Some(stall) = stall {
                tokio::time::sleep(stall).await;
            }
            result
        }
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn at(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        *self.now.lock().unwrap() = now;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::at(t0())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap()
    }
}

/// 2024-05-01 08:00 UTC, the starting point of every test clock.
pub fn t0() -> Timestamp {
    chrono::Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
}

/// `t0` plus a whole number of minutes.
pub fn t0_plus_minutes(minutes: i64) -> Timestamp {
    t0() + chrono::Duration::minutes(minutes)
}
