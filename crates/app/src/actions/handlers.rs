//! Built-in action handlers.

use async_trait::async_trait;
use leadhub_domain::lead::{LeadAssignment, LeadField, LeadNote};
use leadhub_domain::rule::Action;

use super::{ActionContext, ActionError, ActionHandler};
use crate::ports::LeadStore;

/// Template used by `send_email` when the action names none.
pub const DEFAULT_EMAIL_TEMPLATE: &str = "default";

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// The action's `value`; blank strings count as missing.
fn required_value(action: &Action) -> Result<&str, ActionError> {
    non_blank(action.value.as_deref())
        .ok_or_else(|| ActionError::MissingValue(action.action_type.clone()))
}

/// `update_status` / `update_priority`: overwrite one lead field.
#[derive(Debug, Clone, Copy)]
pub struct UpdateField {
    field: LeadField,
}

impl UpdateField {
    #[must_use]
    pub fn status() -> Self {
        Self {
            field: LeadField::Status,
        }
    }

    #[must_use]
    pub fn priority() -> Self {
        Self {
            field: LeadField::Priority,
        }
    }
}

#[async_trait]
impl<S: LeadStore + Send + Sync> ActionHandler<S> for UpdateField {
    async fn execute(
        &self,
        store: &S,
        ctx: &ActionContext,
        action: &Action,
    ) -> Result<String, ActionError> {
        let value = required_value(action)?;
        store
            .set_field(ctx.user_id, ctx.lead_id, self.field, value)
            .await?;
        Ok(match self.field {
            LeadField::Status => format!("Status aggiornato a {value}"),
            LeadField::Priority => format!("Priorità aggiornata a {value}"),
        })
    }
}

/// `assign_to`: hand the lead to someone, recording which rule did it.
#[derive(Debug, Clone, Copy)]
pub struct AssignTo;

#[async_trait]
impl<S: LeadStore + Send + Sync> ActionHandler<S> for AssignTo {
    async fn execute(
        &self,
        store: &S,
        ctx: &ActionContext,
        action: &Action,
    ) -> Result<String, ActionError> {
        let assignee = required_value(action)?;
        let assignment =
            LeadAssignment::by_rule(ctx.lead_id, ctx.user_id, assignee.to_string(), ctx.rule_id);
        store.create_assignment(assignment).await?;
        Ok(format!("Lead assegnato a {assignee}"))
    }
}

/// `add_note`: attach an automation note to the lead.
#[derive(Debug, Clone, Copy)]
pub struct AddNote;

#[async_trait]
impl<S: LeadStore + Send + Sync> ActionHandler<S> for AddNote {
    async fn execute(
        &self,
        store: &S,
        ctx: &ActionContext,
        action: &Action,
    ) -> Result<String, ActionError> {
        let content = required_value(action)?;
        let note = LeadNote::by_rule(ctx.lead_id, ctx.user_id, content.to_string(), ctx.rule_id);
        store.create_note(note).await?;
        Ok("Nota aggiunta".to_string())
    }
}

/// `trigger_lead_score` / `trigger_enrichment`: the work happens in an
/// external service; the handler only acknowledges the request.
#[derive(Debug, Clone, Copy)]
pub struct ExternalWebhook {
    what: &'static str,
}

impl ExternalWebhook {
    #[must_use]
    pub fn lead_score() -> Self {
        Self {
            what: "Ricalcolo lead score",
        }
    }

    #[must_use]
    pub fn enrichment() -> Self {
        Self {
            what: "Arricchimento lead",
        }
    }
}

#[async_trait]
impl<S: LeadStore + Send + Sync> ActionHandler<S> for ExternalWebhook {
    async fn execute(
        &self,
        _store: &S,
        _ctx: &ActionContext,
        _action: &Action,
    ) -> Result<String, ActionError> {
        Ok(format!("{} richiesto (richiede chiamata webhook esterna)", self.what))
    }
}

/// `send_email`: resolve the template name; delivery is external.
#[derive(Debug, Clone, Copy)]
pub struct SendEmail;

impl SendEmail {
    /// `template`, else `value`, else [`DEFAULT_EMAIL_TEMPLATE`]; blank
    /// entries are skipped.
    #[must_use]
    pub fn template(action: &Action) -> &str {
        non_blank(action.template.as_deref())
            .or_else(|| non_blank(action.value.as_deref()))
            .unwrap_or(DEFAULT_EMAIL_TEMPLATE)
    }
}

#[async_trait]
impl<S: LeadStore + Send + Sync> ActionHandler<S> for SendEmail {
    async fn execute(
        &self,
        _store: &S,
        _ctx: &ActionContext,
        action: &Action,
    ) -> Result<String, ActionError> {
        Ok(format!(
            "Email con template '{}' accodata per l'invio",
            Self::template(action)
        ))
    }
}
