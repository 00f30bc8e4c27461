//! Lead store port: the lead records actions read and write.

use std::future::Future;
use std::sync::Arc;

use leadhub_domain::error::LeadHubError;
use leadhub_domain::id::{LeadId, UserId};
use leadhub_domain::lead::{Lead, LeadAssignment, LeadField, LeadNote};

/// Access to leads and the records automation attaches to them.
///
/// Lookups and writes are always scoped to the owning user; a lead owned
/// by someone else behaves as missing.
pub trait LeadStore {
    /// Persist a new lead.
    fn create_lead(&self, lead: Lead) -> impl Future<Output = Result<Lead, LeadHubError>> + Send;

    /// Get a lead by id, scoped to its owner.
    fn get_lead(
        &self,
        user_id: UserId,
        id: LeadId,
    ) -> impl Future<Output = Result<Option<Lead>, LeadHubError>> + Send;

    /// Overwrite one writable field.
    ///
    /// Fails with [`LeadHubError::NotFound`] when the lead is missing or
    /// not owned by `user_id`.
    fn set_field(
        &self,
        user_id: UserId,
        id: LeadId,
        field: LeadField,
        value: &str,
    ) -> impl Future<Output = Result<(), LeadHubError>> + Send;

    /// Record an assignment.
    fn create_assignment(
        &self,
        assignment: LeadAssignment,
    ) -> impl Future<Output = Result<LeadAssignment, LeadHubError>> + Send;

    /// Record a note.
    fn create_note(
        &self,
        note: LeadNote,
    ) -> impl Future<Output = Result<LeadNote, LeadHubError>> + Send;
}

impl<T: LeadStore + Send + Sync> LeadStore for Arc<T> {
    fn create_lead(&self, lead: Lead) -> impl Future<Output = Result<Lead, LeadHubError>> + Send {
        (**self).create_lead(lead)
    }

    fn get_lead(
        &self,
        user_id: UserId,
        id: LeadId,
    ) -> impl Future<Output = Result<Option<Lead>, LeadHubError>> + Send {
        (**self).get_lead(user_id, id)
    }

    fn set_field(
        &self,
        user_id: UserId,
        id: LeadId,
        field: LeadField,
        value: &str,
    ) -> impl Future<Output = Result<(), LeadHubError>> + Send {
        (**self).set_field(user_id, id, field, value)
    }

    fn create_assignment(
        &self,
        assignment: LeadAssignment,
    ) -> impl Future<Output = Result<LeadAssignment, LeadHubError>> + Send {
        (**self).create_assignment(assignment)
    }

    fn create_note(
        &self,
        note: LeadNote,
    ) -> impl Future<Output = Result<LeadNote, LeadHubError>> + Send {
        (**self).create_note(note)
    }
}
