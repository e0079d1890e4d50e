//! Local store: the whole record list as one JSON array under a fixed slot key.
//!
//! Read on every list, rewritten on every create/update/delete. New records
//! go to the front so the stored order is newest first.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{BackendKind, HospitalStore, KeyValueSlots, StoreError};
use crate::models::{Hospital, HospitalPatch, NewHospital};

pub struct LocalStore {
    slots: KeyValueSlots,
    key: String,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

/// Random component followed by a millisecond timestamp component.
pub fn generate_local_id() -> String {
    let random: u64 = rand::random();
    format!("{random:016x}{:x}", Utc::now().timestamp_millis())
}

impl LocalStore {
    pub fn new(slots: KeyValueSlots, key: &str) -> Self {
        Self {
            slots,
            key: key.to_string(),
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> Result<Vec<Hospital>, StoreError> {
        match self.slots.get(&self.key).await? {
            Some(blob) if !blob.trim().is_empty() => Ok(serde_json::from_str(&blob)?),
            _ => Ok(Vec::new()),
        }
    }

    async fn write_all(&self, records: &[Hospital]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(records)?;
        self.slots.set(&self.key, &blob).await
    }
}

#[async_trait]
impl HospitalStore for LocalStore {
    fn backend(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn list(&self) -> Result<Vec<Hospital>, StoreError> {
        self.read_all().await
    }

    async fn create(&self, payload: &NewHospital) -> Result<Hospital, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;

        let mut id = generate_local_id();
        while records.iter().any(|r| r.id == id) {
            id = generate_local_id();
        }

        let record = payload.clone().into_record(id, Utc::now());
        records.insert(0, record.clone());
        self.write_all(&records).await?;

        tracing::debug!(id = %record.id, "Local record created");
        Ok(record)
    }

    async fn update(&self, id: &str, patch: &HospitalPatch) -> Result<Hospital, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;

        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        record.apply(patch);
        let updated = record.clone();

        self.write_all(&records).await?;
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_all().await?;

        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() != before {
            self.write_all(&records).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HospitalCategory, HospitalStatus, Teleconsultation};

    fn payload(name: &str) -> NewHospital {
        NewHospital {
            name: name.into(),
            status: HospitalStatus::Active,
            country: "FR".into(),
            city: "Paris".into(),
            category: HospitalCategory::Hospital,
            speciality: Some("Cardiology".into()),
            website: None,
            email: None,
            telephone: Some("0102030405".into()),
            teleconsultation: Teleconsultation::Yes,
        }
    }

    fn store_in(dir: &tempfile::TempDir) -> LocalStore {
        LocalStore::new(KeyValueSlots::new(dir.path()), "hospitals_v1")
    }

    #[tokio::test]
    async fn empty_store_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_then_list_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let created = store.create(&payload("City Hospital")).await.unwrap();
        assert!(!created.id.is_empty());
        assert!(created.created_at.is_some());

        let listed = store.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert!(listed[0].matches(&payload("City Hospital")));
        assert_eq!(listed[0].id, created.id);
    }

    #[tokio::test]
    async fn newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.create(&payload("First")).await.unwrap();
        store.create(&payload("Second")).await.unwrap();

        let names: Vec<_> = store.list().await.unwrap().into_iter().map(|h| h.name).collect();
        assert_eq!(names, vec!["Second", "First"]);
    }

    #[tokio::test]
    async fn ids_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let a = store.create(&payload("A")).await.unwrap();
        let b = store.create(&payload("B")).await.unwrap();
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn update_merges_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let created = store.create(&payload("City Hospital")).await.unwrap();

        let patch = HospitalPatch {
            telephone: Some(Some("0999".into())),
            ..Default::default()
        };
        let updated = store.update(&created.id, &patch).await.unwrap();

        let mut expected = created.clone();
        expected.telephone = Some("0999".into());
        assert_eq!(updated, expected);
        assert_eq!(store.list().await.unwrap(), vec![expected]);
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let err = store
            .update("nope", &HospitalPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(id) if id == "nope"));
    }

    #[tokio::test]
    async fn delete_missing_id_is_silent_and_repeatable() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let kept = store.create(&payload("Kept")).await.unwrap();

        store.delete("ghost").await.unwrap();
        store.delete("ghost").await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn delete_removes_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        let gone = store.create(&payload("Gone")).await.unwrap();
        store.delete(&gone.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn persisted_blob_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        store_in(&dir).create(&payload("Durable")).await.unwrap();
        let reopened = store_in(&dir);
        assert_eq!(reopened.list().await.unwrap()[0].name, "Durable");
    }

    #[tokio::test]
    async fn corrupt_blob_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let slots = KeyValueSlots::new(dir.path());
        slots.set("hospitals_v1", "{not json").await.unwrap();
        let store = LocalStore::new(slots, "hospitals_v1");
        assert!(matches!(
            store.list().await,
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn local_id_has_random_and_time_parts() {
        let id = generate_local_id();
        assert!(id.len() > 16);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(generate_local_id(), generate_local_id());
    }
}
