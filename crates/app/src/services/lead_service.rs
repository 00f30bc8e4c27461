//! Lead service: the minimal lead surface needed to drive the engine.

use leadhub_domain::error::{LeadHubError, NotFoundError};
use leadhub_domain::id::{LeadId, UserId};
use leadhub_domain::lead::Lead;

use crate::ports::LeadStore;

/// Application service for creating and reading leads.
pub struct LeadService<S> {
    store: S,
}

impl<S: LeadStore> LeadService<S> {
    /// Create a new service backed by the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Create a lead with default status and priority.
    ///
    /// # Errors
    ///
    /// Returns [`LeadHubError::Validation`] for a blank name, or a storage
    /// error from the store.
    #[tracing::instrument(skip(self, name, email))]
    pub async fn create_lead(
        &self,
        user_id: UserId,
        name: String,
        email: Option<String>,
    ) -> Result<Lead, LeadHubError> {
        let lead = Lead::new(user_id, name.trim(), email)?;
        self.store.create_lead(lead).await
    }

    /// Look up a lead owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LeadHubError::NotFound`] when the lead does not exist or
    /// belongs to another user.
    pub async fn get_lead(&self, user_id: UserId, id: LeadId) -> Result<Lead, LeadHubError> {
        self.store.get_lead(user_id, id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Lead",
                id: id.to_string(),
            }
            .into()
        })
    }
}
