//! Investigation audit trail
//!
//! Append-only, per-case record of every pipeline step. Entries are never
//! mutated once written. Appends for all cases go through one lock so that
//! concurrent investigations cannot lose entries.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use tracing::debug;
use uuid::Uuid;

/// One logged pipeline step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub id: String,
    pub case_id: String,
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub component: String,
    pub input_summary: String,
    pub output_summary: String,
    pub evidence_ids: Vec<String>,
    pub duration_ms: u64,
}

/// All entries logged for a case
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditTrail {
    pub case_id: String,
    pub entries: Vec<AuditEntry>,
    pub total_duration_ms: u64,
}

impl AuditTrail {
    /// SHA-256 over the ordered entries, hex encoded. Any edit, insertion,
    /// removal or reordering of entries changes the digest.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.case_id.as_bytes());
        for entry in &self.entries {
            for field in [
                &entry.id,
                &entry.action,
                &entry.component,
                &entry.input_summary,
                &entry.output_summary,
            ] {
                hasher.update(field.as_bytes());
                hasher.update([0u8]);
            }
            hasher.update(entry.timestamp.to_rfc3339().as_bytes());
            for id in &entry.evidence_ids {
                hasher.update(id.as_bytes());
                hasher.update([0u8]);
            }
            hasher.update(entry.duration_ms.to_be_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Actions in logging order
    pub fn actions(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.action.as_str()).collect()
    }
}

/// A step to be logged
#[derive(Debug, Clone, Default)]
pub struct AuditStep {
    case_id: String,
    action: String,
    component: String,
    input_summary: String,
    output_summary: String,
    evidence_ids: Vec<String>,
    duration_ms: u64,
}

impl AuditStep {
    pub fn new(
        case_id: impl Into<String>,
        action: impl Into<String>,
        component: impl Into<String>,
    ) -> Self {
        Self {
            case_id: case_id.into(),
            action: action.into(),
            component: component.into(),
            ..Default::default()
        }
    }

    pub fn input(mut self, summary: impl Into<String>) -> Self {
        self.input_summary = summary.into();
        self
    }

    pub fn output(mut self, summary: impl Into<String>) -> Self {
        self.output_summary = summary.into();
        self
    }

    pub fn evidence(mut self, ids: Vec<String>) -> Self {
        self.evidence_ids = ids;
        self
    }

    pub fn duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}

/// Per-case audit log
#[derive(Debug, Default)]
pub struct AuditLog {
    trails: Mutex<HashMap<String, Vec<AuditEntry>>>,
}

impl AuditLog {
    /// Create an empty audit log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one entry for a pipeline step
    pub fn log_step(&self, step: AuditStep) -> AuditEntry {
        let entry = AuditEntry {
            id: format!("AUD-{}", short_id()),
            case_id: step.case_id,
            timestamp: Utc::now(),
            action: step.action,
            component: step.component,
            input_summary: step.input_summary,
            output_summary: step.output_summary,
            evidence_ids: step.evidence_ids,
            duration_ms: step.duration_ms,
        };

        debug!(
            case_id = %entry.case_id,
            action = %entry.action,
            component = %entry.component,
            duration_ms = entry.duration_ms,
            "audit step recorded"
        );

        self.trails
            .lock()
            .entry(entry.case_id.clone())
            .or_default()
            .push(entry.clone());
        entry
    }

    /// All entries for a case plus the sum of their durations
    pub fn trail(&self, case_id: &str) -> AuditTrail {
        let entries = self
            .trails
            .lock()
            .get(case_id)
            .cloned()
            .unwrap_or_default();
        let total_duration_ms = entries.iter().map(|e| e.duration_ms).sum();

        AuditTrail {
            case_id: case_id.to_string(),
            entries,
            total_duration_ms,
        }
    }

    /// Remove every entry for a case
    pub fn clear(&self, case_id: &str) {
        if self.trails.lock().remove(case_id).is_some() {
            debug!(case_id = %case_id, "audit trail cleared");
        }
    }

    /// Start a timed scope. The entry is written exactly once, when the scope
    /// is finished or dropped, whichever comes first.
    pub fn scope(
        &self,
        case_id: impl Into<String>,
        action: impl Into<String>,
        component: impl Into<String>,
        input_summary: impl Into<String>,
    ) -> AuditScope<'_> {
        AuditScope {
            log: self,
            step: Some(AuditStep::new(case_id, action, component).input(input_summary)),
            outcome: Outcome::Pending,
            started: Instant::now(),
        }
    }

    /// Run `work` inside a timed scope. On `Err` the error text becomes the
    /// output summary; on `Ok` whatever `work` set on the scope is kept.
    pub fn timed<T, E, F>(
        &self,
        case_id: &str,
        action: &str,
        component: &str,
        input_summary: impl Into<String>,
        work: F,
    ) -> Result<T, E>
    where
        E: fmt::Display,
        F: FnOnce(&mut AuditScope<'_>) -> Result<T, E>,
    {
        let mut scope = self.scope(case_id, action, component, input_summary);
        let result = work(&mut scope);
        if let Err(err) = &result {
            scope.fail(err.to_string());
        }
        result
    }
}

#[derive(Debug)]
enum Outcome {
    Pending,
    Completed(String),
    Failed(String),
}

/// Timed audit scope; see [`AuditLog::scope`]
#[derive(Debug)]
pub struct AuditScope<'a> {
    log: &'a AuditLog,
    step: Option<AuditStep>,
    outcome: Outcome,
    started: Instant,
}

impl AuditScope<'_> {
    /// Record the output summary and supporting evidence ids
    pub fn set_output(&mut self, summary: impl Into<String>, evidence_ids: Vec<String>) {
        self.outcome = Outcome::Completed(summary.into());
        if let Some(step) = self.step.take() {
            self.step = Some(step.evidence(evidence_ids));
        }
    }

    /// Mark the unit of work as failed
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.outcome = Outcome::Failed(reason.into());
    }

    /// Write the entry now and return it
    pub fn finish(mut self) -> Option<AuditEntry> {
        self.write()
    }

    fn write(&mut self) -> Option<AuditEntry> {
        let step = self.step.take()?;
        let output = match &self.outcome {
            Outcome::Completed(summary) => summary.clone(),
            Outcome::Failed(reason) => format!("Error: {}", reason),
            Outcome::Pending if std::thread::panicking() => "Error: panicked".to_string(),
            Outcome::Pending => "Completed successfully".to_string(),
        };
        let duration_ms = self.started.elapsed().as_millis() as u64;
        Some(self.log.log_step(step.output(output).duration_ms(duration_ms)))
    }
}

impl Drop for AuditScope<'_> {
    fn drop(&mut self) {
        self.write();
    }
}

/// First eight hex digits of a fresh v4 UUID, upper-cased
pub(crate) fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}
