//! Import pipeline: extracted payload → validator → mapper → registrar → report

use crate::error::{IngestError, IngestResult};
use crate::models::raw::parse_document;
use crate::models::{
    FieldError, NormalizedObservation, ProvenanceConfig, RawObservation, Reason, RecordIdentity,
    ValidationOutcome,
};
use crate::services::{
    BatchRegistrar, CareLogStore, Credentials, Report, SchemaValidator, StagedRecord,
    SummaryReporter, SymbolMapper, ValidationContext,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Parse an extracted document (bare array or `{"records": [...]}`)
pub fn parse_input(text: &str) -> IngestResult<Vec<Value>> {
    parse_document(text).map_err(|e| IngestError::Input(e.to_string()))
}

/// Dry-run view of one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewEntry {
    pub identity: RecordIdentity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observation: Option<NormalizedObservation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<FieldError>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<FieldError>,
}

impl From<StagedRecord> for PreviewEntry {
    fn from(record: StagedRecord) -> Self {
        let (observation, diagnostics) = match record.observation {
            Ok(observation) => (Some(observation), Vec::new()),
            Err(diagnostics) => (None, diagnostics),
        };
        Self {
            identity: record.identity,
            observation,
            diagnostics,
            warnings: record.warnings,
        }
    }
}

/// Validator and mapper configured for one batch
#[derive(Debug, Clone, Default)]
pub struct ImportPipeline {
    validator: SchemaValidator,
    mapper: SymbolMapper,
}

impl ImportPipeline {
    pub fn new(context: ValidationContext, provenance: ProvenanceConfig) -> Self {
        Self {
            validator: SchemaValidator::new(context),
            mapper: SymbolMapper::new(provenance),
        }
    }

    /// Validate and map every record; no I/O
    pub fn stage(&self, records: Vec<Value>) -> Vec<StagedRecord> {
        let staged: Vec<StagedRecord> = records
            .into_iter()
            .enumerate()
            .map(|(index, value)| self.stage_one(index, value))
            .collect();

        let rejected = staged.iter().filter(|r| r.observation.is_err()).count();
        tracing::info!(
            records = staged.len(),
            rejected,
            "Validated extracted records"
        );

        staged
    }

    fn stage_one(&self, index: usize, value: Value) -> StagedRecord {
        let raw = match RawObservation::from_json(value) {
            Ok(raw) => raw,
            Err(other) => {
                return StagedRecord {
                    identity: RecordIdentity::unreadable(index),
                    observation: Err(vec![FieldError::new(
                        "record",
                        other.to_string(),
                        Reason::WrongType {
                            expected: "object".into(),
                        },
                    )]),
                    warnings: Vec::new(),
                };
            }
        };

        let identity = RecordIdentity::capture(index, &raw);

        match self.validator.validate(&raw) {
            ValidationOutcome::Accepted {
                observation,
                warnings,
            } => StagedRecord {
                identity,
                observation: Ok(self.mapper.map(&observation)),
                warnings,
            },
            ValidationOutcome::Rejected { errors, warnings } => {
                tracing::debug!(
                    record = %identity,
                    errors = errors.len(),
                    "Record rejected by validator"
                );
                StagedRecord {
                    identity,
                    observation: Err(errors),
                    warnings,
                }
            }
        }
    }

    /// What a run would send, without touching the network
    pub fn preview(&self, records: Vec<Value>) -> Vec<PreviewEntry> {
        self.stage(records).into_iter().map(PreviewEntry::from).collect()
    }

    /// Full run: stage, register, summarize
    pub async fn run(
        &self,
        store: Arc<dyn CareLogStore>,
        credentials: Credentials,
        records: Vec<Value>,
        cancel: &CancellationToken,
    ) -> IngestResult<Report> {
        let staged = self.stage(records);
        let outcome = BatchRegistrar::new(store, credentials)
            .run(staged, cancel)
            .await?;
        Ok(SummaryReporter::summarize(&outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeSlot;
    use serde_json::json;
    use shelter_common::time::YearMonth;

    fn pipeline() -> ImportPipeline {
        ImportPipeline::new(
            ValidationContext::new(Some(YearMonth::new(2025, 11).unwrap()), 2025),
            ProvenanceConfig::default(),
        )
    }

    #[test]
    fn test_parse_input_accepts_wrapped_and_bare() {
        assert_eq!(parse_input(r#"[{"subject": 1}]"#).unwrap().len(), 1);
        assert_eq!(parse_input(r#"{"records": [{}, {}]}"#).unwrap().len(), 2);
        assert!(matches!(parse_input("not json"), Err(IngestError::Input(_))));
    }

    #[test]
    fn test_stage_keeps_one_entry_per_input() {
        let staged = pipeline().stage(vec![
            json!({"subject": "Tama", "date": "11/3", "time_slot": "朝", "appetite": "○"}),
            json!("loose string"),
            json!({"subject": "Mike", "date": "11/3"}),
        ]);

        assert_eq!(staged.len(), 3);
        let indices: Vec<_> = staged.iter().map(|r| r.identity.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        let first = staged[0].observation.as_ref().unwrap();
        assert_eq!(first.time_slot, TimeSlot::Morning);
        assert_eq!(first.appetite, 5);

        let second = staged[1].observation.as_ref().unwrap_err();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].field, "record");
        assert_eq!(
            second[0].reason,
            Reason::WrongType {
                expected: "object".into()
            }
        );

        let third = staged[2].observation.as_ref().unwrap_err();
        assert_eq!(third[0].reason, Reason::MissingRequired);
    }

    #[test]
    fn test_rejected_record_keeps_window_warning() {
        let staged = pipeline().stage(vec![json!({
            "subject": "Tama",
            "date": "2025-10-31",
            "time_slot": "朝",
            "appetite": 9
        })]);

        let errors = staged[0].observation.as_ref().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "appetite");
        assert_eq!(staged[0].warnings.len(), 1);
        assert_eq!(
            staged[0].warnings[0].reason,
            Reason::OutsideExpectedWindow {
                expected: "2025-11".into()
            }
        );
    }

    #[test]
    fn test_preview_carries_warnings() {
        let preview = pipeline().preview(vec![json!({
            "subject": 3,
            "date": "2025-10-31",
            "time_slot": "evening"
        })]);

        assert_eq!(preview.len(), 1);
        assert!(preview[0].observation.is_some());
        assert!(preview[0].diagnostics.is_empty());
        assert_eq!(preview[0].warnings.len(), 1);
    }
}
