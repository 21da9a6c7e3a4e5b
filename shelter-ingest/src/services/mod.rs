//! Pipeline components
//!
//! Validator and mapper are pure. The registrar owns all network I/O and
//! drives the resolver over the catalog snapshot it fetches.

pub mod batch_registrar;
pub mod care_log_client;
pub mod schema_validator;
pub mod subject_resolver;
pub mod summary_reporter;
pub mod symbol_mapper;

pub use batch_registrar::{BatchRegistrar, StagedRecord, CANCELLED_REASON};
pub use care_log_client::{CareLogStore, Credentials, HttpCareLogStore, SessionToken};
pub use schema_validator::{SchemaValidator, ValidationContext};
pub use subject_resolver::{resolve, ResolveError, SubjectResolver};
pub use summary_reporter::{FailureDetail, Report, SuccessDetail, SummaryReporter, WarningDetail};
pub use symbol_mapper::{SymbolMapper, DEFAULTS};
