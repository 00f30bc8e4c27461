//! # leadhub-domain
//!
//! Pure domain model for the leadhub automation rule engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Rules** (trigger type + condition tree + action group, owned by a user)
//! - Define **Conditions** (recursive boolean trees) and their pure evaluator
//! - Define **Actions** and **Action Groups** (ordered side effects on a lead)
//! - Define **Leads** and the records actions create (assignments, notes)
//! - Define the **Execution** report and the immutable audit log entry
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod execution;
pub mod lead;
pub mod rule;
