//! Subject resolver: sheet reference → catalog animal id
//!
//! Pure lookup over the snapshot fetched at batch start. No network I/O.

use crate::models::catalog::name_key;
use crate::models::{CatalogEntry, CatalogSnapshot, SubjectId, SubjectRef};
use std::collections::HashMap;
use thiserror::Error;

/// Resolution failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("No animal matches {0}")]
    NotFound(SubjectRef),

    #[error("{reference} matches {} animals (ids: {})", .candidates.len(), candidate_ids(.candidates))]
    Ambiguous {
        reference: SubjectRef,
        candidates: Vec<CatalogEntry>,
    },
}

fn candidate_ids(candidates: &[CatalogEntry]) -> String {
    candidates
        .iter()
        .map(|c| c.id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolve one reference against the snapshot
///
/// Names match case-insensitively and exactly (never by substring). More
/// than one match is an error, not a pick.
pub fn resolve(reference: &SubjectRef, snapshot: &CatalogSnapshot) -> Result<SubjectId, ResolveError> {
    match reference {
        SubjectRef::Id(id) if *id > 0 => snapshot
            .get(*id)
            .map(|entry| entry.id)
            .ok_or_else(|| ResolveError::NotFound(reference.clone())),
        SubjectRef::Id(_) => Err(ResolveError::NotFound(reference.clone())),
        SubjectRef::Name(name) => match snapshot.find_by_name(name).as_slice() {
            [] => Err(ResolveError::NotFound(reference.clone())),
            [only] => Ok(only.id),
            many => Err(ResolveError::Ambiguous {
                reference: reference.clone(),
                candidates: many.iter().map(|&entry| entry.clone()).collect(),
            }),
        },
    }
}

/// Memo key: names compare case-insensitively
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum MemoKey {
    Id(SubjectId),
    Name(String),
}

impl From<&SubjectRef> for MemoKey {
    fn from(reference: &SubjectRef) -> Self {
        match reference {
            SubjectRef::Id(id) => MemoKey::Id(*id),
            SubjectRef::Name(name) => MemoKey::Name(name_key(name)),
        }
    }
}

/// Batch-scoped resolver memoizing every unique reference
#[derive(Debug)]
pub struct SubjectResolver {
    snapshot: CatalogSnapshot,
    memo: HashMap<MemoKey, Result<SubjectId, ResolveError>>,
    lookups: usize,
}

impl SubjectResolver {
    pub fn new(snapshot: CatalogSnapshot) -> Self {
        Self {
            snapshot,
            memo: HashMap::new(),
            lookups: 0,
        }
    }

    pub fn resolve(&mut self, reference: &SubjectRef) -> Result<SubjectId, ResolveError> {
        let snapshot = &self.snapshot;
        let lookups = &mut self.lookups;
        self.memo
            .entry(MemoKey::from(reference))
            .or_insert_with(|| {
                *lookups += 1;
                resolve(reference, snapshot)
            })
            .clone()
    }

    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    /// Snapshot lookups performed so far (cache misses)
    pub fn lookups(&self) -> usize {
        self.lookups
    }
}
