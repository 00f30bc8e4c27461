//! # leadhub-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the port traits defined in `leadhub-app::ports`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and database rows
//!
//! Identifiers are stored as hyphenated UUID text and timestamps as
//! fixed-width RFC 3339 text, so `ORDER BY` on them follows time order.
//!
//! ## Dependency rule
//! Depends on `leadhub-app` (for port traits) and `leadhub-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod codec;
mod error;
mod execution_log_repo;
mod lead_store;
mod pool;
mod rule_repo;

pub use error::StorageError;
pub use execution_log_repo::SqliteExecutionLogRepository;
pub use lead_store::SqliteLeadStore;
pub use pool::{Config, Database};
pub use rule_repo::SqliteRuleRepository;
