//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod execution_log;
pub mod lead_store;
pub mod rule_repo;

pub use execution_log::ExecutionLogRepository;
pub use lead_store::LeadStore;
pub use rule_repo::RuleRepository;
