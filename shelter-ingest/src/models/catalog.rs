//! Animal catalog snapshot
//!
//! Fetched once at batch start and frozen for the rest of the run.

use super::observation::SubjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One animal as listed by the remote catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: SubjectId,
    pub name: String,
}

/// Name key used for case-insensitive exact matching
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Read-only index over the catalog
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    entries: Vec<CatalogEntry>,
    by_id: HashMap<SubjectId, usize>,
    by_name: HashMap<String, Vec<usize>>,
}

impl CatalogSnapshot {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        let mut by_id = HashMap::with_capacity(entries.len());
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();

        for (pos, entry) in entries.iter().enumerate() {
            by_id.insert(entry.id, pos);
            by_name.entry(name_key(&entry.name)).or_default().push(pos);
        }

        Self {
            entries,
            by_id,
            by_name,
        }
    }

    pub fn get(&self, id: SubjectId) -> Option<&CatalogEntry> {
        self.by_id.get(&id).map(|&pos| &self.entries[pos])
    }

    /// Every entry whose name matches (case-insensitive, exact)
    pub fn find_by_name(&self, name: &str) -> Vec<&CatalogEntry> {
        self.by_name
            .get(&name_key(name))
            .map(|positions| positions.iter().map(|&pos| &self.entries[pos]).collect())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: SubjectId, name: &str) -> CatalogEntry {
        CatalogEntry {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_lookup_by_id_and_name() {
        let snapshot = CatalogSnapshot::new(vec![entry(1, "Tama"), entry(2, "Mike")]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get(2).map(|e| e.name.as_str()), Some("Mike"));
        assert!(snapshot.get(3).is_none());
        assert_eq!(snapshot.find_by_name(" tama ").len(), 1);
    }

    #[test]
    fn test_name_match_is_exact_not_substring() {
        let snapshot = CatalogSnapshot::new(vec![entry(1, "Tama"), entry(2, "Tamako")]);
        let found = snapshot.find_by_name("tama");
        assert_eq!(found, vec![&entry(1, "Tama")]);
    }

    #[test]
    fn test_duplicate_names_are_all_indexed() {
        let snapshot = CatalogSnapshot::new(vec![entry(1, "Kuro"), entry(5, "KURO")]);
        let ids: Vec<_> = snapshot.find_by_name("kuro").iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 5]);
    }
}
