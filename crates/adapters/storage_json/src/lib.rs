//! # scenehub-adapter-storage-json
//!
//! File-backed scenario store: `scenarios.json` and `scenario-logs.json` in
//! one data directory, pretty-printed and versioned.
//!
//! ## Responsibilities
//! - Implement `ScenarioStore` from `scenehub-app::ports`
//! - Read both the versioned envelope and legacy bare-array documents
//! - Write atomically (temp file + rename)
//! - Move unreadable files aside instead of overwriting them
//!
//! ## Dependency rule
//! Depends on `scenehub-app` (for port traits) and `scenehub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod document;
pub mod error;
pub mod store;

pub use error::StorageError;
pub use store::JsonFileStore;
