//! # scenehub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `ScenarioStore`: load/save scenarios, load/append run logs
//!   - `DeviceControl`: send a command batch to one device
//!   - `Clock`: where "now" comes from
//! - Define **driving/inbound** use-cases:
//!   - `ScenarioService`: create, update, toggle, delete, list, record runs
//!   - `CommandDispatcher`: send commands, never fail
//!   - `ScenarioExecutor`: run immediate actions, schedule delayed ones
//!   - `ScenarioSweeper`: execute due scenarios, trigger one on demand
//!   - `Scheduler`: the operations exposed to the HTTP adapter
//! - Provide **in-process infrastructure** (pending-action timers) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `scenehub-domain` only (plus `tokio` for timers and locks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod dispatcher;
pub mod executor;
pub mod pending;
pub mod ports;
pub mod scheduler;
pub mod services;
pub mod sweeper;

#[cfg(test)]
mod test_support;
