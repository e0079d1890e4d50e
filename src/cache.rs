//! In-memory mirror of the last successful fetch, plus the search filter.

use crate::models::Hospital;

/// Ordered records as returned by the store, with a revision counter that
/// moves on every change.
#[derive(Debug, Default, Clone)]
pub struct HospitalCache {
    records: Vec<Hospital>,
    revision: u64,
}

impl HospitalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> &[Hospital] {
        &self.records
    }

    pub fn find(&self, id: &str) -> Option<&Hospital> {
        self.records.iter().find(|h| h.id == id)
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Swap in a fresh fetch. Duplicate ids keep their first occurrence.
    pub fn replace(&mut self, records: Vec<Hospital>) {
        let mut seen = std::collections::HashSet::new();
        self.records = records
            .into_iter()
            .filter(|h| seen.insert(h.id.clone()))
            .collect();
        self.revision += 1;
    }

    /// Put a newly created record in front.
    pub fn prepend(&mut self, record: Hospital) {
        self.records.retain(|h| h.id != record.id);
        self.records.insert(0, record);
        self.revision += 1;
    }

    /// Replace the record with the same id in place, or prepend it.
    pub fn upsert(&mut self, record: Hospital) {
        match self.records.iter_mut().find(|h| h.id == record.id) {
            Some(slot) => {
                *slot = record;
                self.revision += 1;
            }
            None => self.prepend(record),
        }
    }

    /// Drop a record. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.records.len();
        self.records.retain(|h| h.id != id);
        let removed = self.records.len() != before;
        if removed {
            self.revision += 1;
        }
        removed
    }
}

/// Trimmed, lower-cased search query.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Records whose serialized form contains `query`, case-insensitively.
/// An empty query keeps everything. Order is preserved.
pub fn filter<'a>(records: &'a [Hospital], query: &str) -> Vec<&'a Hospital> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return records.iter().collect();
    }
    records
        .iter()
        .filter(|h| {
            serde_json::to_string(h)
                .map(|text| text.to_lowercase().contains(&needle))
                .unwrap_or(false)
        })
        .collect()
}
