//! # scenehub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** over the scheduler operations
//!   (`/api/scenarios`, `/api/scenarios/{id}`, `/api/scenarios/check`, …)
//! - Map HTTP requests into scheduler calls (driving adapter)
//! - Map results into HTTP responses: absent scenarios become `404`,
//!   validation failures `400`, storage failures `500`
//!
//! ## Dependency rule
//! Depends on `scenehub-app` (for port traits and the scheduler) and
//! `scenehub-domain` (for domain types used in request/response mapping).
//! Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
