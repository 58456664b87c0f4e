//! # scenehub-adapter-cloud
//!
//! Device control through the IoT cloud's HTTP command endpoint.
//!
//! ## Responsibilities
//! - Implement `DeviceControl` from `scenehub-app::ports`
//! - `POST {base_url}/v1.0/iot-03/devices/{device_id}/commands` with
//!   `{"commands": [...]}`
//! - Map the cloud's `{success, msg}` reply to a `CommandResult`
//!
//! Request signing is left to a gateway in front of the cloud; this adapter
//! only attaches an optional bearer token.
//!
//! ## Dependency rule
//! Depends on `scenehub-app` (for port traits) and `scenehub-domain` (for domain types).

pub mod client;
pub mod error;

pub use client::{CloudConfig, CloudDeviceControl};
pub use error::CloudError;
