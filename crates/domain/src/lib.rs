//! # scenehub-domain
//!
//! Pure domain model for the scenehub scenario scheduler.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Scenarios** (recurring rules: an interval plus device actions)
//! - Define **Device commands** (`{code, value}` pairs) and their results
//! - Define **Scenario logs** (one immutable record per executed action)
//! - Contain all schedule invariants (`next_run` recomputation, due checks)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod command;
pub mod scenario;
pub mod scenario_log;
