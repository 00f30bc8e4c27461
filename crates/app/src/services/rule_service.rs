//! Rule service: use-cases for managing a user's automation rules.

use leadhub_domain::error::{LeadHubError, NotFoundError};
use leadhub_domain::id::{RuleId, UserId};
use leadhub_domain::rule::{
    AutomationRule, DEFAULT_MAX_RULES_PER_USER, RuleDraft, RuleFilter, RulePatch,
};
use leadhub_domain::time::now;

use crate::ports::RuleRepository;

/// Application service for rule CRUD with ownership and quota checks.
pub struct RuleService<R> {
    repo: R,
    max_rules_per_user: usize,
}

impl<R: RuleRepository> RuleService<R> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            max_rules_per_user: DEFAULT_MAX_RULES_PER_USER,
        }
    }

    /// Override the per-user rule quota.
    #[must_use]
    pub fn with_max_rules_per_user(mut self, max: usize) -> Self {
        self.max_rules_per_user = max;
        self
    }

    /// Validate `draft` and store it as a new rule owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LeadHubError::Validation`] if invariants fail,
    /// [`LeadHubError::QuotaExceeded`] when the user already owns the
    /// maximum number of rules, or a storage error from the repository.
    #[tracing::instrument(skip(self, draft), fields(rule_name = %draft.name))]
    pub async fn create_rule(
        &self,
        user_id: UserId,
        draft: RuleDraft,
    ) -> Result<AutomationRule, LeadHubError> {
        let rule = draft.into_rule(user_id)?;
        let result = self
            .repo
            .create_within_quota(rule, self.max_rules_per_user)
            .await;
        if let Err(LeadHubError::QuotaExceeded(err)) = &result {
            tracing::warn!(%user_id, limit = err.limit, "rule quota reached");
        }
        result
    }

    /// Look up a rule owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LeadHubError::NotFound`] when the rule does not exist or
    /// belongs to another user, or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_rule(&self, user_id: UserId, id: RuleId) -> Result<AutomationRule, LeadHubError> {
        self.repo.get_by_id(user_id, id).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Rule",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// List the rules of `user_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_rules(
        &self,
        user_id: UserId,
        filter: RuleFilter,
    ) -> Result<Vec<AutomationRule>, LeadHubError> {
        self.repo.list_for_user(user_id, filter).await
    }

    /// Apply a partial update to a rule owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LeadHubError::NotFound`] for a rule the user does not own,
    /// [`LeadHubError::Validation`] when the patched rule is invalid, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_rule(
        &self,
        user_id: UserId,
        id: RuleId,
        patch: RulePatch,
    ) -> Result<AutomationRule, LeadHubError> {
        let mut rule = self.get_rule(user_id, id).await?;
        patch.apply(&mut rule, now());
        rule.validate()?;
        self.repo.update(rule).await
    }

    /// Delete a rule owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LeadHubError::NotFound`] for a rule the user does not own,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_rule(&self, user_id: UserId, id: RuleId) -> Result<(), LeadHubError> {
        self.get_rule(user_id, id).await?;
        self.repo.delete(user_id, id).await
    }
}
