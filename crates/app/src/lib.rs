//! # leadhub-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `RuleRepository`: CRUD for automation rules plus the execution counter
//!   - `LeadStore`: lead lookup and the writes actions perform
//!   - `ExecutionLogRepository`: append & query the audit trail
//! - Define **driving/inbound ports** as use-case structs:
//!   - `RuleService`: create (with quota), list, get, update, delete
//!   - `LeadService`: create, get
//!   - `ExecutionLogService`: filtered audit queries
//!   - `RuleEngine`: evaluate conditions, run actions, record outcomes
//! - Provide the **action registry** mapping action types to handlers
//!
//! ## Dependency rule
//! Depends on `leadhub-domain` only. Never imports adapter crates.
//! Adapters depend on *this* crate, not the reverse.

pub mod actions;
pub mod ports;
pub mod rule_engine;
pub mod services;

#[cfg(test)]
mod testing;
