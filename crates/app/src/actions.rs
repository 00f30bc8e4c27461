//! Action executor: applies one action to a lead through a handler registry.
//!
//! Each [`ActionType`] maps to an [`ActionHandler`]. The registry never lets
//! a failure escape: every call produces an [`AppliedAction`] whose
//! `success` flag and message describe what happened, so one bad action
//! cannot stop its siblings.

mod handlers;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use leadhub_domain::error::LeadHubError;
use leadhub_domain::execution::AppliedAction;
use leadhub_domain::id::{LeadId, RuleId, UserId};
use leadhub_domain::rule::{Action, ActionGroup, ActionType};

pub use handlers::{AddNote, AssignTo, ExternalWebhook, SendEmail, UpdateField};

use crate::ports::LeadStore;

/// Who and what an action is applied for.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext {
    pub lead_id: LeadId,
    pub user_id: UserId,
    pub rule_id: RuleId,
}

/// Why a handler could not apply an action.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("value mancante per {0}")]
    MissingValue(ActionType),

    #[error(transparent)]
    Store(#[from] LeadHubError),
}

/// Applies one kind of action against a [`LeadStore`].
///
/// Returns the human-readable success message.
#[async_trait]
pub trait ActionHandler<S>: Send + Sync {
    async fn execute(
        &self,
        store: &S,
        ctx: &ActionContext,
        action: &Action,
    ) -> Result<String, ActionError>;
}

/// Maps action types to their handlers.
///
/// Built once at startup and shared immutably.
pub struct ActionRegistry<S> {
    handlers: HashMap<ActionType, Arc<dyn ActionHandler<S>>>,
}

impl<S: LeadStore + Send + Sync + 'static> ActionRegistry<S> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registry with a handler for every built-in action type.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for action_type in ActionType::BUILTIN {
            if let Some(handler) = builtin_handler(&action_type) {
                registry.register(action_type, handler);
            }
        }
        registry
    }

    /// Register a handler, replacing any previous one for `action_type`.
    pub fn register(&mut self, action_type: ActionType, handler: Arc<dyn ActionHandler<S>>) {
        self.handlers.insert(action_type, handler);
    }

    /// Whether a handler exists for `action_type`.
    #[must_use]
    pub fn supports(&self, action_type: &ActionType) -> bool {
        self.handlers.contains_key(action_type)
    }

    /// Apply one action. Never fails; the outcome carries the error text.
    pub async fn apply(&self, store: &S, ctx: &ActionContext, action: &Action) -> AppliedAction {
        let action_type = action.action_type.clone();
        let Some(handler) = self.handlers.get(&action_type) else {
            tracing::warn!(rule_id = %ctx.rule_id, action = %action_type, "unsupported action");
            let message = format!("azione non supportata: {action_type}");
            return AppliedAction::failed(action_type, message);
        };
        match handler.execute(store, ctx, action).await {
            Ok(message) => AppliedAction::succeeded(action_type, message),
            Err(err) => {
                tracing::warn!(
                    rule_id = %ctx.rule_id,
                    lead_id = %ctx.lead_id,
                    action = %action_type,
                    error = %err,
                    "action failed"
                );
                AppliedAction::failed(action_type, err.to_string())
            }
        }
    }

    /// Run an action group in order, without stopping on failures.
    pub async fn run(
        &self,
        store: &S,
        ctx: &ActionContext,
        group: &ActionGroup,
    ) -> Vec<AppliedAction> {
        let mut applied = Vec::with_capacity(group.actions().len());
        for action in group.actions() {
            applied.push(self.apply(store, ctx, action).await);
        }
        applied
    }
}

impl<S: LeadStore + Send + Sync + 'static> Default for ActionRegistry<S> {
    fn default() -> Self {
        Self::with_builtin()
    }
}

fn builtin_handler<S>(action_type: &ActionType) -> Option<Arc<dyn ActionHandler<S>>>
where
    S: LeadStore + Send + Sync + 'static,
{
    let handler: Arc<dyn ActionHandler<S>> = match action_type {
        ActionType::UpdateStatus => Arc::new(UpdateField::status()),
        ActionType::UpdatePriority => Arc::new(UpdateField::priority()),
        ActionType::AssignTo => Arc::new(AssignTo),
        ActionType::AddNote => Arc::new(AddNote),
        ActionType::TriggerLeadScore => Arc::new(ExternalWebhook::lead_score()),
        ActionType::TriggerEnrichment => Arc::new(ExternalWebhook::enrichment()),
        ActionType::SendEmail => Arc::new(SendEmail),
        ActionType::Other(_) => return None,
    };
    Some(handler)
}
