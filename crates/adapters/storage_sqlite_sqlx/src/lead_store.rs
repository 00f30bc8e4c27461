//! `SQLite` implementation of [`LeadStore`].

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use leadhub_app::ports::LeadStore;
use leadhub_domain::error::{LeadHubError, NotFoundError};
use leadhub_domain::id::{LeadId, UserId};
use leadhub_domain::lead::{Lead, LeadAssignment, LeadField, LeadNote};
use leadhub_domain::time::to_sortable;

use crate::codec::{parse, parse_timestamp};
use crate::error::StorageError;

struct Wrapper(Lead);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let user_id: String = row.try_get("user_id")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(Lead {
            id: parse(&id)?,
            user_id: parse(&user_id)?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            status: row.try_get("status")?,
            priority: row.try_get("priority")?,
            created_at: parse_timestamp(&created_at)?,
        }))
    }
}

fn lead_not_found(id: LeadId) -> LeadHubError {
    NotFoundError {
        entity: "Lead",
        id: id.to_string(),
    }
    .into()
}

/// `SQLite`-backed lead store.
pub struct SqliteLeadStore {
    pool: SqlitePool,
}

impl SqliteLeadStore {
    /// Create a new store backed by the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl LeadStore for SqliteLeadStore {
    async fn create_lead(&self, lead: Lead) -> Result<Lead, LeadHubError> {
        sqlx::query(
            "INSERT INTO leads (id, user_id, name, email, status, priority, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(lead.id.to_string())
        .bind(lead.user_id.to_string())
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.status)
        .bind(&lead.priority)
        .bind(to_sortable(&lead.created_at))
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        Ok(lead)
    }

    async fn get_lead(&self, user_id: UserId, id: LeadId) -> Result<Option<Lead>, LeadHubError> {
        let row: Option<Wrapper> = sqlx::query_as("SELECT * FROM leads WHERE id = ? AND user_id = ?")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(StorageError::from)?;
        Ok(row.map(|w| w.0))
    }

    async fn set_field(
        &self,
        user_id: UserId,
        id: LeadId,
        field: LeadField,
        value: &str,
    ) -> Result<(), LeadHubError> {
        let sql = format!(
            "UPDATE leads SET {} = ? WHERE id = ? AND user_id = ?",
            field.as_str()
        );
        let result = sqlx::query(&sql)
            .bind(value)
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(lead_not_found(id));
        }
        Ok(())
    }

    async fn create_assignment(
        &self,
        assignment: LeadAssignment,
    ) -> Result<LeadAssignment, LeadHubError> {
        let result = sqlx::query(
            "INSERT INTO lead_assignments (id, lead_id, user_id, assigned_to, rule_id, note, created_at) SELECT ?, id, user_id, ?, ?, ?, ? FROM leads WHERE id = ? AND user_id = ?",
        )
        .bind(assignment.id.to_string())
        .bind(&assignment.assigned_to)
        .bind(assignment.rule_id.to_string())
        .bind(&assignment.note)
        .bind(to_sortable(&assignment.created_at))
        .bind(assignment.lead_id.to_string())
        .bind(assignment.user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(lead_not_found(assignment.lead_id));
        }
        Ok(assignment)
    }

    async fn create_note(&self, note: LeadNote) -> Result<LeadNote, LeadHubError> {
        let result = sqlx::query(
            "INSERT INTO lead_notes (id, lead_id, user_id, content, source, rule_id, created_at) SELECT ?, id, user_id, ?, ?, ?, ? FROM leads WHERE id = ? AND user_id = ?",
        )
        .bind(note.id.to_string())
        .bind(&note.content)
        .bind(note.source.as_str())
        .bind(note.rule_id.map(|id| id.to_string()))
        .bind(to_sortable(&note.created_at))
        .bind(note.lead_id.to_string())
        .bind(note.user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(StorageError::from)?;

        if result.rows_affected() == 0 {
            return Err(lead_not_found(note.lead_id));
        }
        Ok(note)
    }
}
