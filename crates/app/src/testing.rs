//! In-memory port implementations shared by the unit tests of this crate.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use leadhub_domain::error::{LeadHubError, NotFoundError, QuotaExceededError};
use leadhub_domain::execution::{ExecutionLogEntry, ExecutionLogQuery};
use leadhub_domain::id::{LeadId, RuleId, UserId};
use leadhub_domain::lead::{Lead, LeadAssignment, LeadField, LeadNote};
use leadhub_domain::rule::{AutomationRule, RuleFilter, TriggerType};
use leadhub_domain::time::Timestamp;

use crate::ports::{ExecutionLogRepository, LeadStore, RuleRepository};

fn storage_failure() -> LeadHubError {
    LeadHubError::Storage("simulated storage failure".into())
}

fn lead_not_found(id: LeadId) -> LeadHubError {
    NotFoundError {
        entity: "Lead",
        id: id.to_string(),
    }
    .into()
}

// ── Rules ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryRuleRepo {
    rules: Mutex<Vec<AutomationRule>>,
    fail_record: AtomicBool,
}

impl InMemoryRuleRepo {
    pub fn with(rules: Vec<AutomationRule>) -> Self {
        Self {
            rules: Mutex::new(rules),
            fail_record: AtomicBool::new(false),
        }
    }

    pub fn fail_record_execution(&self) {
        self.fail_record.store(true, Ordering::SeqCst);
    }

    pub fn rule(&self, id: RuleId) -> Option<AutomationRule> {
        self.rules
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    fn sorted(&self, keep: impl Fn(&AutomationRule) -> bool) -> Vec<AutomationRule> {
        let mut rules: Vec<AutomationRule> = self
            .rules
            .lock()
            .unwrap()
            .iter()
            .filter(|r| keep(r))
            .cloned()
            .collect();
        rules.sort_by_key(|r| r.created_at);
        rules
    }
}

impl RuleRepository for InMemoryRuleRepo {
    fn create_within_quota(
        &self,
        rule: AutomationRule,
        limit: usize,
    ) -> impl Future<Output = Result<AutomationRule, LeadHubError>> + Send {
        let mut rules = self.rules.lock().unwrap();
        let owned = rules.iter().filter(|r| r.user_id == rule.user_id).count();
        let result = if owned < limit {
            rules.push(rule.clone());
            Ok(rule)
        } else {
            Err(QuotaExceededError { limit }.into())
        };
        async { result }
    }

    fn get_by_id(
        &self,
        user_id: UserId,
        id: RuleId,
    ) -> impl Future<Output = Result<Option<AutomationRule>, LeadHubError>> + Send {
        let result = self.rule(id).filter(|r| r.user_id == user_id);
        async { Ok(result) }
    }

    fn list_for_user(
        &self,
        user_id: UserId,
        filter: RuleFilter,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, LeadHubError>> + Send {
        let result = self.sorted(|r| r.user_id == user_id && filter.matches(r));
        async { Ok(result) }
    }

    fn list_active_for_trigger(
        &self,
        user_id: UserId,
        trigger_type: TriggerType,
    ) -> impl Future<Output = Result<Vec<AutomationRule>, LeadHubError>> + Send {
        let result = self.sorted(|r| r.user_id == user_id && r.listens_to(trigger_type));
        async { Ok(result) }
    }

    fn update(
        &self,
        rule: AutomationRule,
    ) -> impl Future<Output = Result<AutomationRule, LeadHubError>> + Send {
        let mut rules = self.rules.lock().unwrap();
        let result = match rules.iter_mut().find(|r| r.id == rule.id) {
            Some(slot) => {
                *slot = rule.clone();
                Ok(rule)
            }
            None => Err(NotFoundError {
                entity: "Rule",
                id: rule.id.to_string(),
            }
            .into()),
        };
        async { result }
    }

    fn delete(
        &self,
        user_id: UserId,
        id: RuleId,
    ) -> impl Future<Output = Result<(), LeadHubError>> + Send {
        self.rules
            .lock()
            .unwrap()
            .retain(|r| !(r.id == id && r.user_id == user_id));
        async { Ok(()) }
    }

    fn record_execution(
        &self,
        id: RuleId,
        at: Timestamp,
    ) -> impl Future<Output = Result<(), LeadHubError>> + Send {
        let result = if self.fail_record.load(Ordering::SeqCst) {
            Err(storage_failure())
        } else {
            match self.rules.lock().unwrap().iter_mut().find(|r| r.id == id) {
                Some(rule) => {
                    rule.execution_count += 1;
                    rule.last_executed_at = Some(at);
                    Ok(())
                }
                None => Err(NotFoundError {
                    entity: "Rule",
                    id: id.to_string(),
                }
                .into()),
            }
        };
        async { result }
    }
}

// ── Leads ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryLeadStore {
    leads: Mutex<HashMap<LeadId, Lead>>,
    assignments: Mutex<Vec<LeadAssignment>>,
    notes: Mutex<Vec<LeadNote>>,
}

impl InMemoryLeadStore {
    pub fn insert(&self, lead: Lead) {
        self.leads.lock().unwrap().insert(lead.id, lead);
    }

    pub fn lead(&self, id: LeadId) -> Option<Lead> {
        self.leads.lock().unwrap().get(&id).cloned()
    }

    pub fn assignments(&self) -> Vec<LeadAssignment> {
        self.assignments.lock().unwrap().clone()
    }

    pub fn notes(&self) -> Vec<LeadNote> {
        self.notes.lock().unwrap().clone()
    }

    fn owns(&self, user_id: UserId, id: LeadId) -> bool {
        self.lead(id).is_some_and(|l| l.user_id == user_id)
    }
}

impl LeadStore for InMemoryLeadStore {
    fn create_lead(&self, lead: Lead) -> impl Future<Output = Result<Lead, LeadHubError>> + Send {
        self.insert(lead.clone());
        async { Ok(lead) }
    }

    fn get_lead(
        &self,
        user_id: UserId,
        id: LeadId,
    ) -> impl Future<Output = Result<Option<Lead>, LeadHubError>> + Send {
        let result = self.lead(id).filter(|l| l.user_id == user_id);
        async { Ok(result) }
    }

    fn set_field(
        &self,
        user_id: UserId,
        id: LeadId,
        field: LeadField,
        value: &str,
    ) -> impl Future<Output = Result<(), LeadHubError>> + Send {
        let mut leads = self.leads.lock().unwrap();
        let result = match leads.get_mut(&id).filter(|l| l.user_id == user_id) {
            Some(lead) => {
                match field {
                    LeadField::Status => lead.status = value.to_string(),
                    LeadField::Priority => lead.priority = value.to_string(),
                }
                Ok(())
            }
            None => Err(lead_not_found(id)),
        };
        async { result }
    }

    fn create_assignment(
        &self,
        assignment: LeadAssignment,
    ) -> impl Future<Output = Result<LeadAssignment, LeadHubError>> + Send {
        let result = if self.owns(assignment.user_id, assignment.lead_id) {
            self.assignments.lock().unwrap().push(assignment.clone());
            Ok(assignment)
        } else {
            Err(lead_not_found(assignment.lead_id))
        };
        async { result }
    }

    fn create_note(
        &self,
        note: LeadNote,
    ) -> impl Future<Output = Result<LeadNote, LeadHubError>> + Send {
        let result = if self.owns(note.user_id, note.lead_id) {
            self.notes.lock().unwrap().push(note.clone());
            Ok(note)
        } else {
            Err(lead_not_found(note.lead_id))
        };
        async { result }
    }
}

// ── Execution log ──────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryExecutionLog {
    entries: Mutex<Vec<ExecutionLogEntry>>,
    fail_append: AtomicBool,
}

impl InMemoryExecutionLog {
    pub fn fail_append(&self) {
        self.fail_append.store(true, Ordering::SeqCst);
    }

    pub fn entries(&self) -> Vec<ExecutionLogEntry> {
        self.entries.lock().unwrap().clone()
    }
}

impl ExecutionLogRepository for InMemoryExecutionLog {
    fn append(
        &self,
        entry: ExecutionLogEntry,
    ) -> impl Future<Output = Result<ExecutionLogEntry, LeadHubError>> + Send {
        let result = if self.fail_append.load(Ordering::SeqCst) {
            Err(storage_failure())
        } else {
            self.entries.lock().unwrap().push(entry.clone());
            Ok(entry)
        };
        async { result }
    }

    fn list(
        &self,
        query: ExecutionLogQuery,
    ) -> impl Future<Output = Result<Vec<ExecutionLogEntry>, LeadHubError>> + Send {
        let result: Vec<ExecutionLogEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|e| query.matches(e))
            .take(query.limit)
            .cloned()
            .collect();
        async { Ok(result) }
    }
}
