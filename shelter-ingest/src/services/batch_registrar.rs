//! Batch registration client
//!
//! One run = one login, one catalog snapshot, then every staged record in
//! input order. Each record contributes exactly one [`RecordResult`]; a
//! failing record never stops the run. Only a failed login or catalog fetch
//! aborts, and then before any record is attempted.

use crate::error::{IngestError, IngestResult, StoreError};
use crate::models::{
    BatchOutcome, CatalogSnapshot, FailureStage, FieldError, NormalizedObservation, RecordIdentity,
    RecordOutcome, RecordResult,
};
use crate::services::care_log_client::{CareLogStore, Credentials, SessionToken};
use crate::services::subject_resolver::{ResolveError, SubjectResolver};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Reason recorded for records skipped after cancellation
pub const CANCELLED_REASON: &str = "not attempted: run cancelled";

/// A record after validation and mapping, waiting for registration
#[derive(Debug, Clone)]
pub struct StagedRecord {
    pub identity: RecordIdentity,
    /// Validator diagnostics when rejected, the mapped record otherwise
    pub observation: Result<NormalizedObservation, Vec<FieldError>>,
    /// Soft diagnostics carried into the report
    pub warnings: Vec<FieldError>,
}

/// Why one record did not register
#[derive(Debug)]
enum RecordError {
    Rejected(Vec<FieldError>),
    Unresolved(ResolveError),
    Store(StoreError),
}

impl From<RecordError> for RecordResult {
    fn from(error: RecordError) -> Self {
        match error {
            RecordError::Rejected(diagnostics) => RecordResult::rejected(diagnostics),
            RecordError::Unresolved(e) => RecordResult::failure(FailureStage::Resolution, e.to_string()),
            RecordError::Store(e) => RecordResult::failure(FailureStage::Registration, e.to_string()),
        }
    }
}

/// State that lives for exactly one run
struct BatchSession {
    token: SessionToken,
    resolver: SubjectResolver,
}

/// Registers staged records against a care-log store
pub struct BatchRegistrar {
    store: Arc<dyn CareLogStore>,
    credentials: Credentials,
}

impl BatchRegistrar {
    pub fn new(store: Arc<dyn CareLogStore>, credentials: Credentials) -> Self {
        Self { store, credentials }
    }

    /// Run one batch
    ///
    /// Returns `Err` only for run-level failures (login, catalog). When
    /// cancelled, records not yet attempted are appended as registration
    /// failures so the outcome still has one entry per input record.
    pub async fn run(
        &self,
        staged: Vec<StagedRecord>,
        cancel: &CancellationToken,
    ) -> IngestResult<BatchOutcome> {
        let mut outcome = BatchOutcome::new();
        let valid = staged.iter().filter(|r| r.observation.is_ok()).count();

        tracing::info!(
            run_id = %outcome.run_id,
            records = staged.len(),
            valid,
            "Starting batch registration"
        );

        let mut session = self.open_session().await?;

        for record in staged {
            if cancel.is_cancelled() {
                outcome.cancelled = true;
                outcome.push(RecordOutcome {
                    identity: record.identity,
                    result: RecordResult::failure(FailureStage::Registration, CANCELLED_REASON),
                    warnings: record.warnings,
                });
                continue;
            }

            let result = match self.attempt(&mut session, &record.observation).await {
                Ok(remote_id) => RecordResult::Success { remote_id },
                Err(error) => RecordResult::from(error),
            };

            match &result {
                RecordResult::Success { remote_id } => tracing::info!(
                    record = %record.identity,
                    remote_id,
                    "Care log registered"
                ),
                RecordResult::Failure { stage, reason, .. } => tracing::warn!(
                    record = %record.identity,
                    stage = %stage,
                    reason = %reason,
                    "Record failed"
                ),
            }

            outcome.push(RecordOutcome {
                identity: record.identity,
                result,
                warnings: record.warnings,
            });
        }

        if outcome.cancelled {
            tracing::warn!(run_id = %outcome.run_id, "Batch cancelled before completion");
        }

        // Session token dropped here
        drop(session);
        Ok(outcome.finish())
    }

    /// Login and catalog fetch; either failing aborts the run
    async fn open_session(&self) -> IngestResult<BatchSession> {
        let token = self
            .store
            .authenticate(&self.credentials)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Batch authentication failed");
                IngestError::Authentication(e.to_string())
            })?;

        let catalog = self.store.fetch_catalog(&token).await.map_err(|e| {
            tracing::error!(error = %e, "Catalog fetch failed");
            IngestError::Catalog(e.to_string())
        })?;

        tracing::info!(animals = catalog.len(), "Catalog snapshot loaded");

        Ok(BatchSession {
            token,
            resolver: SubjectResolver::new(CatalogSnapshot::new(catalog)),
        })
    }

    async fn attempt(
        &self,
        session: &mut BatchSession,
        observation: &Result<NormalizedObservation, Vec<FieldError>>,
    ) -> Result<u64, RecordError> {
        let observation = observation
            .as_ref()
            .map_err(|diagnostics| RecordError::Rejected(diagnostics.clone()))?;

        let animal_id = session
            .resolver
            .resolve(&observation.subject)
            .map_err(RecordError::Unresolved)?;

        self.store
            .register(&session.token, &observation.to_request(animal_id))
            .await
            .map_err(RecordError::Store)
    }
}
