//! Execution log service: read side of the audit trail.

use leadhub_domain::error::LeadHubError;
use leadhub_domain::execution::{ExecutionLogEntry, ExecutionLogQuery};
use leadhub_domain::id::{LeadId, RuleId, UserId};

use crate::ports::ExecutionLogRepository;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_LOG_LIMIT: usize = 50;

/// Largest page a caller may request.
pub const MAX_LOG_LIMIT: usize = 200;

/// Application service for querying execution logs.
pub struct ExecutionLogService<L> {
    repo: L,
    default_limit: usize,
    max_limit: usize,
}

impl<L: ExecutionLogRepository> ExecutionLogService<L> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: L) -> Self {
        Self {
            repo,
            default_limit: DEFAULT_LOG_LIMIT,
            max_limit: MAX_LOG_LIMIT,
        }
    }

    /// Override the default and maximum page sizes.
    #[must_use]
    pub fn with_limits(mut self, default_limit: usize, max_limit: usize) -> Self {
        self.default_limit = default_limit;
        self.max_limit = max_limit;
        self
    }

    /// Entries of `user_id`, newest first, optionally narrowed to one rule
    /// or lead. `limit` is clamped to `1..=max_limit`.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_logs(
        &self,
        user_id: UserId,
        rule_id: Option<RuleId>,
        lead_id: Option<LeadId>,
        limit: Option<usize>,
    ) -> Result<Vec<ExecutionLogEntry>, LeadHubError> {
        let limit = limit
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1));
        self.repo
            .list(ExecutionLogQuery {
                user_id,
                rule_id,
                lead_id,
                limit,
            })
            .await
    }
}
