//! Execution log port: append-only audit trail of matched rules.

use std::future::Future;
use std::sync::Arc;

use leadhub_domain::error::LeadHubError;
use leadhub_domain::execution::{ExecutionLogEntry, ExecutionLogQuery};

/// Append-only sink for [`ExecutionLogEntry`]s.
pub trait ExecutionLogRepository {
    /// Persist a new entry. Entries are never updated.
    fn append(
        &self,
        entry: ExecutionLogEntry,
    ) -> impl Future<Output = Result<ExecutionLogEntry, LeadHubError>> + Send;

    /// Entries matching `query`, newest first, at most `query.limit`.
    fn list(
        &self,
        query: ExecutionLogQuery,
    ) -> impl Future<Output = Result<Vec<ExecutionLogEntry>, LeadHubError>> + Send;
}

impl<T: ExecutionLogRepository + Send + Sync> ExecutionLogRepository for Arc<T> {
    fn append(
        &self,
        entry: ExecutionLogEntry,
    ) -> impl Future<Output = Result<ExecutionLogEntry, LeadHubError>> + Send {
        (**self).append(entry)
    }

    fn list(
        &self,
        query: ExecutionLogQuery,
    ) -> impl Future<Output = Result<Vec<ExecutionLogEntry>, LeadHubError>> + Send {
        (**self).list(query)
    }
}
