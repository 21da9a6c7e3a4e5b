//! Summary reporter: batch outcome → operator report
//!
//! [`SummaryReporter::summarize`] is a pure projection. Log output happens
//! only when the caller asks for it via [`Report::emit_log_trail`].

use crate::models::{BatchOutcome, FailureStage, FieldError, RecordResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One failed record, pointing back at the sheet row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub index: usize,
    pub subject: String,
    pub date: String,
    pub time_slot: String,
    pub stage: FailureStage,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<FieldError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessDetail {
    pub index: usize,
    pub subject: String,
    pub date: String,
    pub time_slot: String,
    pub remote_id: u64,
}

/// Soft diagnostic attached to an input record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarningDetail {
    pub index: usize,
    pub warning: FieldError,
}

/// Operator-facing batch summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub failures: Vec<FailureDetail>,
    pub successes: Vec<SuccessDetail>,
    pub warnings: Vec<WarningDetail>,
}

impl Report {
    /// Every record was registered
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && !self.cancelled
    }

    /// Every record outcome, in input order
    fn trail(&self) -> Vec<TrailEntry<'_>> {
        let mut trail: Vec<TrailEntry<'_>> = self
            .successes
            .iter()
            .map(TrailEntry::Registered)
            .chain(self.failures.iter().map(TrailEntry::Failed))
            .collect();
        trail.sort_by_key(TrailEntry::index);
        trail
    }

    /// Human-readable trail: header, one line per record, then warnings
    pub fn log_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(1 + self.total + self.warnings.len());

        lines.push(format!(
            "run {}: {} records, {} registered, {} failed{}",
            self.run_id,
            self.total,
            self.succeeded,
            self.failed,
            if self.cancelled { " (cancelled)" } else { "" }
        ));

        lines.extend(self.trail().into_iter().map(|entry| match entry {
            TrailEntry::Registered(success) => format!(
                "OK #{} subject={} date={} slot={} remote_id={}",
                success.index, success.subject, success.date, success.time_slot, success.remote_id
            ),
            TrailEntry::Failed(failure) => format!(
                "FAILED #{} subject={} date={} slot={} [{}] {}",
                failure.index,
                failure.subject,
                failure.date,
                failure.time_slot,
                failure.stage,
                failure.reason
            ),
        }));

        for warning in &self.warnings {
            lines.push(format!("WARNING #{} {}", warning.index, warning.warning));
        }

        lines
    }

    /// Write the trail through tracing
    pub fn emit_log_trail(&self) {
        tracing::info!(
            run_id = %self.run_id,
            total = self.total,
            succeeded = self.succeeded,
            failed = self.failed,
            cancelled = self.cancelled,
            "Import finished"
        );

        for entry in self.trail() {
            match entry {
                TrailEntry::Registered(success) => tracing::info!(
                    index = success.index,
                    subject = %success.subject,
                    date = %success.date,
                    time_slot = %success.time_slot,
                    remote_id = success.remote_id,
                    "Registered"
                ),
                TrailEntry::Failed(failure) => tracing::warn!(
                    index = failure.index,
                    subject = %failure.subject,
                    date = %failure.date,
                    time_slot = %failure.time_slot,
                    stage = %failure.stage,
                    "{}",
                    failure.reason
                ),
            }
        }

        for warning in &self.warnings {
            tracing::info!(index = warning.index, "{}", warning.warning);
        }
    }
}

enum TrailEntry<'a> {
    Registered(&'a SuccessDetail),
    Failed(&'a FailureDetail),
}

impl TrailEntry<'_> {
    fn index(&self) -> usize {
        match self {
            TrailEntry::Registered(success) => success.index,
            TrailEntry::Failed(failure) => failure.index,
        }
    }
}

/// Projects batch outcomes into reports
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryReporter;

impl SummaryReporter {
    pub fn summarize(outcome: &BatchOutcome) -> Report {
        let mut failures = Vec::new();
        let mut successes = Vec::new();
        let mut warnings = Vec::new();

        for entry in outcome.entries() {
            let identity = &entry.identity;
            match &entry.result {
                RecordResult::Success { remote_id } => successes.push(SuccessDetail {
                    index: identity.index,
                    subject: identity.subject.clone(),
                    date: identity.date.clone(),
                    time_slot: identity.time_slot.clone(),
                    remote_id: *remote_id,
                }),
                RecordResult::Failure {
                    stage,
                    reason,
                    diagnostics,
                } => failures.push(FailureDetail {
                    index: identity.index,
                    subject: identity.subject.clone(),
                    date: identity.date.clone(),
                    time_slot: identity.time_slot.clone(),
                    stage: *stage,
                    reason: reason.clone(),
                    diagnostics: diagnostics.clone(),
                }),
            }

            warnings.extend(entry.warnings.iter().map(|w| WarningDetail {
                index: identity.index,
                warning: w.clone(),
            }));
        }

        Report {
            run_id: outcome.run_id,
            started_at: outcome.started_at,
            finished_at: outcome.finished_at,
            total: outcome.len(),
            succeeded: successes.len(),
            failed: failures.len(),
            cancelled: outcome.cancelled,
            failures,
            successes,
            warnings,
        }
    }
}
