//! `SQLite` implementation of [`ExecutionLogRepository`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use leadhub_app::ports::ExecutionLogRepository;
use leadhub_domain::error::LeadHubError;
use leadhub_domain::execution::{ExecutionLogEntry, ExecutionLogQuery};
use leadhub_domain::time::to_sortable;

use crate::codec::{parse, parse_json, parse_timestamp};
use crate::error::StorageError;

struct Wrapper(ExecutionLogEntry);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let rule_id: String = row.try_get("rule_id")?;
        let lead_id: String = row.try_get("lead_id")?;
        let user_id: String = row.try_get("user_id")?;
        let trigger_type: String = row.try_get("trigger_type")?;
        let condition_matched: String = row.try_get("condition_matched")?;
        let action_applied: String = row.try_get("action_applied")?;
        let executed_at: String = row.try_get("executed_at")?;

        Ok(Self(ExecutionLogEntry {
            id: parse(&id)?,
            rule_id: parse(&rule_id)?,
            lead_id: parse(&lead_id)?,
            user_id: parse(&user_id)?,
            trigger_type: parse(&trigger_type)?,
            condition_matched: parse_json(&condition_matched)?,
            action_applied: parse_json(&action_applied)?,
            success: row.try_get("success")?,
            error_message: row.try_get("error_message")?,
            executed_at: parse_timestamp(&executed_at)?,
        }))
    }
}

/// `SQLite`-backed execution log.
pub struct SqliteExecutionLogRepository {
    pool: SqlitePool,
}

impl SqliteExecutionLogRepository {
    /// Create a new repository backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl ExecutionLogRepository for SqliteExecutionLogRepository {
    async fn append(&self, entry: ExecutionLogEntry) -> Result<ExecutionLogEntry, LeadHubError> {
        let condition =
            serde_json::to_string(&entry.condition_matched).map_err(StorageError::from)?;
        let action = serde_json::to_string(&entry.action_applied).map_err(StorageError::from)?;

        sqlx::query(
            "INSERT INTO execution_logs (id, rule_id, lead_id, user_id, trigger_type, condition_matched, action_applied, success, error_message, executed_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.id.to_string())
        .bind(entry.rule_id.to_string())
        .bind(entry.lead_id.to_string())
        .bind(entry.user_id.to_string())
        .bind(entry.trigger_type.as_str())
        .bind(&condition)
        .bind(&action)
        .bind(entry.success)
        .bind(&entry.error_message)
        .bind(to_sortable(&entry.executed_at))
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(entry)
    }

    async fn list(&self, query: ExecutionLogQuery) -> Result<Vec<ExecutionLogEntry>, LeadHubError> {
        let rule_id = query.rule_id.map(|id| id.to_string());
        let lead_id = query.lead_id.map(|id| id.to_string());

        let rows: Vec<Wrapper> = sqlx::query_as(
            "SELECT * FROM execution_logs WHERE user_id = ? AND (? IS NULL OR rule_id = ?) AND (? IS NULL OR lead_id = ?) ORDER BY executed_at DESC, rowid DESC LIMIT ?",
        )
        .bind(query.user_id.to_string())
        .bind(&rule_id)
        .bind(&rule_id)
        .bind(&lead_id)
        .bind(&lead_id)
        .bind(i64::try_from(query.limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(|w| w.0).collect())
    }
}
