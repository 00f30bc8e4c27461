//! `SQLite` implementation of [`RuleRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use leadhub_app::ports::RuleRepository;
use leadhub_domain::error::{LeadHubError, NotFoundError, QuotaExceededError};
use leadhub_domain::id::{RuleId, UserId};
use leadhub_domain::rule::{AutomationRule, RuleFilter, TriggerType};
use leadhub_domain::time::{Timestamp, to_sortable};

use crate::codec::{decode_err, parse, parse_json, parse_timestamp};
use crate::error::StorageError;

const ORDER: &str = "ORDER BY created_at ASC, rowid ASC";

struct Wrapper(AutomationRule);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let user_id: String = row.try_get("user_id")?;
        let trigger_type: String = row.try_get("trigger_type")?;
        let conditions: String = row.try_get("conditions")?;
        let actions: String = row.try_get("actions")?;
        let execution_count: i64 = row.try_get("execution_count")?;
        let last_executed_at: Option<String> = row.try_get("last_executed_at")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self(AutomationRule {
            id: parse(&id)?,
            user_id: parse(&user_id)?,
            name: row.try_get("name")?,
            trigger_type: parse(&trigger_type)?,
            condition: parse_json(&conditions)?,
            action: parse_json(&actions)?,
            is_active: row.try_get("is_active")?,
            execution_count: u64::try_from(execution_count).map_err(decode_err)?,
            last_executed_at: last_executed_at
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        }))
    }
}

/// `SQLite`-backed rule repository.
pub struct SqliteRuleRepository {
    pool: SqlitePool,
}

impl SqliteRuleRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl RuleRepository for SqliteRuleRepository {
    async fn create_within_quota(
        &self,
        rule: AutomationRule,
        limit: usize,
    ) -> Result<AutomationRule, LeadHubError> {
        let conditions = serde_json::to_string(&rule.condition).map_err(StorageError::from)?;
        let actions = serde_json::to_string(&rule.action).map_err(StorageError::from)?;

        // one statement: sqlite takes the write lock before counting
        let result = sqlx::query(
            "INSERT INTO automation_rules (id, user_id, name, trigger_type, conditions, actions, is_active, execution_count, last_executed_at, created_at, updated_at) SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ? WHERE (SELECT COUNT(*) FROM automation_rules WHERE user_id = ?) < ?",
        )
        .bind(rule.id.to_string())
        .bind(rule.user_id.to_string())
        .bind(&rule.name)
        .bind(rule.trigger_type.as_str())
        .bind(&conditions)
        .bind(&actions)
        .bind(rule.is_active)
        .bind(i64::try_from(rule.execution_count).unwrap_or(i64::MAX))
        .bind(rule.last_executed_at.as_ref().map(to_sortable))
        .bind(to_sortable(&rule.created_at))
        .bind(to_sortable(&rule.updated_at))
        .bind(rule.user_id.to_string())
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(QuotaExceededError { limit }.into());
        }
        Ok(rule)
    }

    async fn get_by_id(
        &self,
        user_id: UserId,
        id: RuleId,
    ) -> Result<Option<AutomationRule>, LeadHubError> {
        let row: Option<Wrapper> =
            sqlx::query_as("SELECT * FROM automation_rules WHERE id = ? AND user_id = ?")
                .bind(id.to_string())
                .bind(user_id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(StorageError::from)?;
        Ok(row.map(|w| w.0))
    }

    async fn list_for_user(
        &self,
        user_id: UserId,
        filter: RuleFilter,
    ) -> Result<Vec<AutomationRule>, LeadHubError> {
        let trigger_type = filter.trigger_type.map(TriggerType::as_str);
        let rows: Vec<Wrapper> = sqlx::query_as(&format!(
            "SELECT * FROM automation_rules WHERE user_id = ? AND (? IS NULL OR trigger_type = ?) AND (? IS NULL OR is_active = ?) {ORDER}"
        ))
        .bind(user_id.to_string())
        .bind(trigger_type)
        .bind(trigger_type)
        .bind(filter.is_active)
        .bind(filter.is_active)
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn list_active_for_trigger(
        &self,
        user_id: UserId,
        trigger_type: TriggerType,
    ) -> Result<Vec<AutomationRule>, LeadHubError> {
        let rows: Vec<Wrapper> = sqlx::query_as(&format!(
            "SELECT * FROM automation_rules WHERE user_id = ? AND trigger_type = ? AND is_active = 1 {ORDER}"
        ))
        .bind(user_id.to_string())
        .bind(trigger_type.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }

    async fn update(&self, rule: AutomationRule) -> Result<AutomationRule, LeadHubError> {
        let conditions = serde_json::to_string(&rule.condition).map_err(StorageError::from)?;
        let actions = serde_json::to_string(&rule.action).map_err(StorageError::from)?;

        let result = sqlx::query(
            "UPDATE automation_rules SET name = ?, trigger_type = ?, conditions = ?, actions = ?, is_active = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&rule.name)
        .bind(rule.trigger_type.as_str())
        .bind(&conditions)
        .bind(&actions)
        .bind(rule.is_active)
        .bind(to_sortable(&rule.updated_at))
        .bind(rule.id.to_string())
        .bind(rule.user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError {
                entity: "Rule",
                id: rule.id.to_string(),
            }
            .into());
        }

        // counters may have moved since the caller read the rule
        self.get_by_id(rule.user_id, rule.id)
            .await?
            .ok_or_else(|| {
                NotFoundError {
                    entity: "Rule",
                    id: rule.id.to_string(),
                }
                .into()
            })
    }

    async fn delete(&self, user_id: UserId, id: RuleId) -> Result<(), LeadHubError> {
        sqlx::query("DELETE FROM automation_rules WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(())
    }

    async fn record_execution(&self, id: RuleId, at: Timestamp) -> Result<(), LeadHubError> {
        let result = sqlx::query(
            "UPDATE automation_rules SET execution_count = execution_count + 1, last_executed_at = ? WHERE id = ?",
        )
        .bind(to_sortable(&at))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(NotFoundError {
                entity: "Rule",
                id: id.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::Config;
    use leadhub_domain::rule::{Action, ActionType, Condition, Operator};

    async fn setup() -> SqliteRuleRepository {
        let db = Config {
            database_url: "sqlite::memory:".to_string(),
        }
        .build()
        .await
        .unwrap();
        SqliteRuleRepository::new(db.pool().clone())
    }

    impl SqliteRuleRepository {
        async fn insert(&self, rule: AutomationRule) -> Result<AutomationRule, LeadHubError> {
            self.create_within_quota(rule, usize::MAX).await
        }

        async fn count(&self, user_id: UserId) -> i64 {
            sqlx::query_scalar("SELECT COUNT(*) FROM automation_rules WHERE user_id = ?")
                .bind(user_id.to_string())
                .fetch_one(&self.pool)
                .await
                .unwrap()
        }
    }

    fn rule(user_id: UserId, name: &str) -> AutomationRule {
        AutomationRule::builder()
            .user_id(user_id)
            .name(name)
            .trigger_type(TriggerType::NewLead)
            .condition(Condition::Any(vec![
                Condition::leaf("status", Operator::Eq, "new"),
                Condition::All(vec![
                    Condition::leaf("budget", Operator::Gte, 300_000),
                    Condition::leaf("notes", Operator::Contains, "urgente"),
                ]),
            ]))
            .action(vec![
                Action::with_value(ActionType::UpdatePriority, "high"),
                Action::new(ActionType::TriggerLeadScore),
            ])
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_create_and_retrieve_rule() {
        let repo = setup().await;
        let user_id = UserId::new();
        let original = rule(user_id, "Budget alto");
        let id = original.id;

        repo.insert(original.clone()).await.unwrap();

        let fetched = repo.get_by_id(user_id, id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Budget alto");
        assert_eq!(fetched.trigger_type, TriggerType::NewLead);
        assert_eq!(fetched.condition, original.condition);
        assert_eq!(fetched.action, original.action);
        assert!(fetched.is_active);
        assert_eq!(fetched.execution_count, 0);
        assert!(fetched.last_executed_at.is_none());
    }

    #[tokio::test]
    async fn should_hide_rule_from_other_users() {
        let repo = setup().await;
        let r = rule(UserId::new(), "Privata");
        let id = r.id;
        repo.insert(r).await.unwrap();

        assert!(repo.get_by_id(UserId::new(), id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_list_active_rules_oldest_first() {
        let repo = setup().await;
        let user_id = UserId::new();
        let older = rule(user_id, "Vecchia");
        let mut newer = rule(user_id, "Nuova");
        newer.created_at = older.created_at + chrono::Duration::seconds(1);
        let mut inactive = rule(user_id, "Spenta");
        inactive.is_active = false;
        let mut other_trigger = rule(user_id, "Altro trigger");
        other_trigger.trigger_type = TriggerType::StatusChanged;

        repo.insert(newer).await.unwrap();
        repo.insert(inactive).await.unwrap();
        repo.insert(other_trigger).await.unwrap();
        repo.insert(older).await.unwrap();

        let rules = repo
            .list_active_for_trigger(user_id, TriggerType::NewLead)
            .await
            .unwrap();
        let names: Vec<&str> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Vecchia", "Nuova"]);
    }

    #[tokio::test]
    async fn should_break_created_at_ties_by_insertion_order() {
        let repo = setup().await;
        let user_id = UserId::new();
        let first = rule(user_id, "Prima");
        let mut second = rule(user_id, "Seconda");
        second.created_at = first.created_at;

        repo.insert(first).await.unwrap();
        repo.insert(second).await.unwrap();

        let rules = repo
            .list_active_for_trigger(user_id, TriggerType::NewLead)
            .await
            .unwrap();
        assert_eq!(rules[0].name, "Prima");
        assert_eq!(rules[1].name, "Seconda");
    }

    #[tokio::test]
    async fn should_filter_listing_by_trigger_and_activity() {
        let repo = setup().await;
        let user_id = UserId::new();
        let mut inactive = rule(user_id, "Spenta");
        inactive.is_active = false;
        repo.insert(rule(user_id, "Accesa")).await.unwrap();
        repo.insert(inactive).await.unwrap();
        repo.insert(rule(UserId::new(), "Di altri")).await.unwrap();

        let all = repo
            .list_for_user(user_id, RuleFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let only_inactive = repo
            .list_for_user(
                user_id,
                RuleFilter {
                    trigger_type: Some(TriggerType::NewLead),
                    is_active: Some(false),
                },
            )
            .await
            .unwrap();
        assert_eq!(only_inactive.len(), 1);
        assert_eq!(only_inactive[0].name, "Spenta");
    }

    #[tokio::test]
    async fn should_refuse_insert_when_quota_full() {
        let repo = setup().await;
        let user_id = UserId::new();
        let mut inactive = rule(user_id, "Spenta");
        inactive.is_active = false;
        repo.create_within_quota(rule(user_id, "Accesa"), 2)
            .await
            .unwrap();
        repo.create_within_quota(inactive, 2).await.unwrap();

        let result = repo.create_within_quota(rule(user_id, "Terza"), 2).await;
        assert!(matches!(
            result,
            Err(LeadHubError::QuotaExceeded(QuotaExceededError { limit: 2 }))
        ));
        assert_eq!(repo.count(user_id).await, 2);

        repo.create_within_quota(rule(UserId::new(), "Di altri"), 2)
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn should_hold_quota_under_concurrent_inserts() {
        let repo = std::sync::Arc::new(setup().await);
        let user_id = UserId::new();
        for i in 0..19 {
            repo.create_within_quota(rule(user_id, &format!("Regola {i}")), 20)
                .await
                .unwrap();
        }

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let repo = std::sync::Arc::clone(&repo);
                tokio::spawn(async move {
                    repo.create_within_quota(rule(user_id, &format!("Concorrente {i}")), 20)
                        .await
                })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => created += 1,
                Err(LeadHubError::QuotaExceeded(_)) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(repo.count(user_id).await, 20);
    }

    #[tokio::test]
    async fn should_update_rule_but_keep_counters() {
        let repo = setup().await;
        let user_id = UserId::new();
        let mut r = rule(user_id, "Prima");
        repo.insert(r.clone()).await.unwrap();
        repo.record_execution(r.id, leadhub_domain::time::now())
            .await
            .unwrap();

        r.name = "Rinominata".to_string();
        r.is_active = false;
        let saved = repo.update(r).await.unwrap();
        assert_eq!(saved.name, "Rinominata");
        assert!(!saved.is_active);
        assert_eq!(saved.execution_count, 1);
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_missing_rule() {
        let repo = setup().await;
        let result = repo.update(rule(UserId::new(), "Fantasma")).await;
        assert!(matches!(result, Err(LeadHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_delete_only_own_rule() {
        let repo = setup().await;
        let owner = UserId::new();
        let r = rule(owner, "Da cancellare");
        let id = r.id;
        repo.insert(r).await.unwrap();

        repo.delete(UserId::new(), id).await.unwrap();
        assert!(repo.get_by_id(owner, id).await.unwrap().is_some());

        repo.delete(owner, id).await.unwrap();
        assert!(repo.get_by_id(owner, id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn should_return_not_found_when_recording_execution_of_deleted_rule() {
        let repo = setup().await;
        let user_id = UserId::new();
        let r = rule(user_id, "Cancellata");
        let id = r.id;
        repo.insert(r).await.unwrap();
        repo.delete(user_id, id).await.unwrap();

        let result = repo.record_execution(id, leadhub_domain::time::now()).await;
        assert!(matches!(result, Err(LeadHubError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_increment_execution_count_atomically() {
        let repo = setup().await;
        let user_id = UserId::new();
        let r = rule(user_id, "Contata");
        let id = r.id;
        repo.insert(r).await.unwrap();

        let at = leadhub_domain::time::now();
        repo.record_execution(id, at).await.unwrap();
        repo.record_execution(id, at).await.unwrap();

        let fetched = repo.get_by_id(user_id, id).await.unwrap().unwrap();
        assert_eq!(fetched.execution_count, 2);
        assert_eq!(
            fetched.last_executed_at.as_ref().map(to_sortable),
            Some(to_sortable(&at))
        );
    }
}
