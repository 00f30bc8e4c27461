//! Rule repository port: persistence for automation rules.

use std::future::Future;
use std::sync::Arc;

use leadhub_domain::error::LeadHubError;
use leadhub_domain::id::{RuleId, UserId};
use leadhub_domain::rule::{AutomationRule, RuleFilter, TriggerType};
use leadhub_domain::time::Timestamp;

/// Repository for persisting and querying [`AutomationRule`]s.
///
/// Every listing is ordered by ascending `created_at`, ties broken by
/// insertion order. The engine relies on this order for last-writer-wins.
pub trait RuleRepository {
    /// Store a new rule unless its owner already has `limit` rules, active
    /// and inactive together.
    ///
    /// The count and the insert must be one atomic step, so concurrent
    /// creations can never push a user past `limit`. Fails with
    /// [`LeadHubError::QuotaExceeded`] when the quota is full.
    fn create_within_quota(
        &self,
        rule: AutomationRule,
        limit: usize,
    ) -> impl Future<Output = Result<AutomationRule, LeadHubError>> + Send;

    /// Get a rule by id, scoped to its owner.
    fn get_by_id(
        &self,
        user_id: UserId,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, LeadHubError>> + Send;

    /// List a user's rules matching `filter`.
    fn list_for_user(
        &self,
        user_id: UserId,
        filter: RuleFilter,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, LeadHubError>> + Send;

    /// List a user's active rules for one trigger type.
    fn list_active_for_trigger(
        &self,
        user_id: UserId,
        trigger_type: TriggerType,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, LeadHubError>> + Send;

    /// Replace the editable fields of an existing rule.
    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, LeadHubError>> + Send;

    /// Delete a rule, scoped to its owner.
    fn delete(
        &self,
        user_id: UserId,
        id: RuleId,
    ) -> impl Future<Output = Result<(), LeadHubError>> + Send;

    /// Atomically bump `execution_count` by one and set `last_executed_at`.
    fn record_execution(
        &self,
        id: RuleId,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), LeadHubError>> + Send;
}

impl<T: RuleRepository + Send + Sync> RuleRepository for Arc<T> {
    fn create_within_quota(
        &self,
        rule: AutomationRule,
        limit: usize,
    ) -> impl Future<Output = Result<AutomationRule, LeadHubError>> + Send {
        (**self).create_within_quota(rule, limit)
    }

    fn get_by_id(
        &self,
        user_id: UserId,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, LeadHubError>> + Send {
        (**self).get_by_id(user_id, id)
    }

    fn list_for_user(
        &self,
        user_id: UserId,
        filter: RuleFilter,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, LeadHubError>> + Send {
        (**self).list_for_user(user_id, filter)
    }

    fn list_active_for_trigger(
        &self,
        user_id: UserId,
        trigger_type: TriggerType,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, LeadHubError>> + Send {
        (**self).list_active_for_trigger(user_id, trigger_type)
    }

    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, LeadHubError>> + Send {
        (**self).update(rule)
    }

    fn delete(
        &self,
        user_id: UserId,
        id: RuleId,
    ) -> impl Future<Output = Result<(), LeadHubError>> + Send {
        (**self).delete(user_id, id)
    }

    fn record_execution(
        &self,
        id: RuleId,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), LeadHubError>> + Send {
        (**self).record_execution(id, at)
    }
}
