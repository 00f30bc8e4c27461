//! # leadhub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for rule management (`/api/rules`), trigger
//!   execution (`/api/rules/execute`), the audit trail (`/api/rules/logs`)
//!   and a minimal lead surface (`/api/leads`)
//! - Resolve the caller from the `X-User-Id` header set by the upstream gateway
//! - Map HTTP requests into application service calls (driving adapter)
//! - Map application results and errors into JSON responses
//!
//! ## Dependency rule
//! Depends on `leadhub-app` (for port traits and services) and `leadhub-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod auth;
pub mod error;
pub mod router;
pub mod state;
