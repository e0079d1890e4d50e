//! In-memory `HospitalStore` double shared by panel and API tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::models::{Hospital, HospitalPatch, NewHospital};
use crate::store::{BackendKind, HospitalStore, StoreError};

/// Keeps records in a vector, counts every call, and can be told to fail.
#[derive(Default)]
pub(crate) struct MemoryStore {
    records: Mutex<Vec<Hospital>>,
    calls: AtomicUsize,
    next_id: AtomicUsize,
    failure: Mutex<Option<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<Hospital>) -> Self {
        let store = Self::default();
        *store.records.lock().unwrap() = records;
        store
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every following call fail with a connection error.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn snapshot(&self) -> Vec<Hospital> {
        self.records.lock().unwrap().clone()
    }

    fn enter(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().unwrap().clone() {
            Some(message) => Err(StoreError::Connection(message)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HospitalStore for MemoryStore {
    fn backend(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn list(&self) -> Result<Vec<Hospital>, StoreError> {
        self.enter()?;
        Ok(self.snapshot())
    }

    async fn create(&self, payload: &NewHospital) -> Result<Hospital, StoreError> {
        self.enter()?;
        let id = format!("m{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let record = payload.clone().into_record(id, Utc::now());
        self.records.lock().unwrap().insert(0, record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, patch: &HospitalPatch) -> Result<Hospital, StoreError> {
        self.enter()?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.apply(patch);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.enter()?;
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }
}
