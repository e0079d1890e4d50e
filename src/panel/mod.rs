//! Panel controller: the event wiring between the page, the cache and the
//! persistence adapter.
//!
//! The panel owns the store, the cache, the status indicator, the Save and
//! Refresh control states, the per-record locks and the change broadcast
//! consumed by the browser push channel. Every operation returns a
//! `Result`; nothing here panics out of a handler.

pub mod controls;
pub mod locks;
pub mod status;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tokio::sync::{broadcast, mpsc};

use crate::cache::{filter, HospitalCache};
use crate::config::PanelConfig;
use crate::form::{HospitalForm, SubmitTarget};
use crate::models::{Hospital, HospitalPatch, NewHospital, ValidationError};
use crate::realtime::{spawn_listener, LiveEvent, RealtimeConfig};
use crate::render::{self, PageView, TableBody, Tone};
use crate::store::{build_store, BackendKind, HospitalStore, StoreError};

pub use controls::{Control, ControlGuard};
pub use locks::RecordLocks;
pub use status::SyncStatus;

/// Buffered push messages per subscriber before it starts lagging.
const EVENT_CAPACITY: usize = 64;

/// Shown in the table when the backend settings fail the startup check.
pub const CONFIG_PLACEHOLDER: &str =
    "Configure the backend URL and access key in config.rs";

/// Shown in the table when the initial load fails.
pub const LOAD_FAILED_PLACEHOLDER: &str =
    "Unable to load the records. Check the backend and its access policies.";

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Delete was not confirmed")]
    NotConfirmed,

    #[error("Nothing to update")]
    EmptyPatch,

    #[error("Panel state lock poisoned")]
    LockPoisoned,
}

/// Messages pushed to connected browsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PanelEvent {
    CacheChanged { revision: u64, count: usize },
    StatusChanged { label: &'static str, tone: Tone },
}

/// Point-in-time view of the panel for `/api/status`.
#[derive(Debug, Clone, Serialize)]
pub struct PanelSnapshot {
    pub backend: BackendKind,
    pub configured: bool,
    pub status: SyncStatus,
    pub label: &'static str,
    pub tone: Tone,
    pub revision: u64,
    pub count: usize,
    pub saving: bool,
    pub refreshing: bool,
}

#[derive(Debug)]
struct Indicator {
    status: SyncStatus,
    placeholder: Option<String>,
}

pub struct Panel {
    backend: BackendKind,
    store: Option<Arc<dyn HospitalStore>>,
    config_error: Option<String>,
    cache: RwLock<HospitalCache>,
    indicator: RwLock<Indicator>,
    save: Control,
    refresh: Control,
    locks: RecordLocks,
    events: broadcast::Sender<PanelEvent>,
    realtime: Option<RealtimeConfig>,
    /// Set while the live-update subscription is joined.
    live: AtomicBool,
}

// ═══════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════

impl Panel {
    fn with_parts(
        backend: BackendKind,
        store: Option<Arc<dyn HospitalStore>>,
        config_error: Option<String>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let indicator = match config_error {
            Some(_) => Indicator {
                status: SyncStatus::MissingKeys,
                placeholder: Some(CONFIG_PLACEHOLDER.to_string()),
            },
            None => Indicator {
                status: SyncStatus::Connecting,
                placeholder: None,
            },
        };
        Self {
            backend,
            store,
            config_error,
            cache: RwLock::new(HospitalCache::new()),
            indicator: RwLock::new(indicator),
            save: Control::new("Save", "Saving…"),
            refresh: Control::new("Refresh", "Loading…"),
            locks: RecordLocks::new(),
            events,
            realtime: None,
            live: AtomicBool::new(false),
        }
    }

    pub fn new(store: Arc<dyn HospitalStore>) -> Self {
        Self::with_parts(store.backend(), Some(store), None)
    }

    /// A panel whose backend failed the startup check. It renders the
    /// configuration placeholder and never touches the network.
    pub fn unconfigured(backend: BackendKind, error: impl std::fmt::Display) -> Self {
        Self::with_parts(backend, None, Some(error.to_string()))
    }

    /// Build the store selected by `config`; the hosted backend also gets
    /// the live-update listener.
    pub fn from_config(config: &PanelConfig) -> Self {
        match build_store(config) {
            Ok(store) => {
                let panel = Self::new(store);
                if config.backend != BackendKind::Hosted {
                    return panel;
                }
                match RealtimeConfig::from_hosted(&config.hosted) {
                    Ok(realtime) => panel.with_realtime(realtime),
                    Err(e) => {
                        tracing::warn!(error = %e, "Live updates disabled");
                        panel
                    }
                }
            }
            Err(e) => {
                tracing::error!(backend = %config.backend, error = %e, "Backend configuration rejected");
                Self::unconfigured(config.backend, e)
            }
        }
    }

    pub fn with_realtime(mut self, realtime: RealtimeConfig) -> Self {
        self.realtime = Some(realtime);
        self
    }
}

// ═══════════════════════════════════════════════════════════
// State access
// ═══════════════════════════════════════════════════════════

impl Panel {
    pub fn backend(&self) -> BackendKind {
        self.backend
    }

    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    pub fn config_error(&self) -> Option<&str> {
        self.config_error.as_deref()
    }

    /// Receive cache and status changes.
    pub fn subscribe(&self) -> broadcast::Receiver<PanelEvent> {
        self.events.subscribe()
    }

    pub fn status(&self) -> Result<SyncStatus, PanelError> {
        Ok(self.read_indicator()?.status)
    }

    pub fn placeholder(&self) -> Result<Option<String>, PanelError> {
        Ok(self.read_indicator()?.placeholder.clone())
    }

    /// Copy of the cached records, in store order.
    pub fn records(&self) -> Result<Vec<Hospital>, PanelError> {
        Ok(self.read_cache()?.get().to_vec())
    }

    pub fn snapshot(&self) -> Result<PanelSnapshot, PanelError> {
        let status = self.status()?;
        let cache = self.read_cache()?;
        Ok(PanelSnapshot {
            backend: self.backend,
            configured: self.is_configured(),
            status,
            label: status.label(),
            tone: status.tone(),
            revision: cache.revision(),
            count: cache.len(),
            saving: self.save.is_busy(),
            refreshing: self.refresh.is_busy(),
        })
    }

    fn store(&self) -> Result<Arc<dyn HospitalStore>, PanelError> {
        self.store.clone().ok_or_else(|| {
            PanelError::NotConfigured(self.config_error.clone().unwrap_or_default())
        })
    }

    fn read_cache(&self) -> Result<RwLockReadGuard<'_, HospitalCache>, PanelError> {
        self.cache.read().map_err(|_| PanelError::LockPoisoned)
    }

    fn write_cache(&self) -> Result<RwLockWriteGuard<'_, HospitalCache>, PanelError> {
        self.cache.write().map_err(|_| PanelError::LockPoisoned)
    }

    fn read_indicator(&self) -> Result<RwLockReadGuard<'_, Indicator>, PanelError> {
        self.indicator.read().map_err(|_| PanelError::LockPoisoned)
    }

    fn write_indicator(&self) -> Result<RwLockWriteGuard<'_, Indicator>, PanelError> {
        self.indicator.write().map_err(|_| PanelError::LockPoisoned)
    }

    fn set_status(&self, status: SyncStatus) {
        match self.write_indicator() {
            Ok(mut indicator) => indicator.status = status,
            Err(e) => {
                tracing::error!(error = %e, "Status not updated");
                return;
            }
        }
        let _ = self.events.send(PanelEvent::StatusChanged {
            label: status.label(),
            tone: status.tone(),
        });
    }

    fn set_placeholder(&self, placeholder: Option<&str>) -> Result<(), PanelError> {
        self.write_indicator()?.placeholder = placeholder.map(str::to_string);
        Ok(())
    }

    /// Apply `change` to the cache and announce the new revision.
    fn patch_cache(&self, change: impl FnOnce(&mut HospitalCache)) -> Result<(), PanelError> {
        let (revision, count) = {
            let mut cache = self.write_cache()?;
            change(&mut cache);
            (cache.revision(), cache.len())
        };
        let _ = self.events.send(PanelEvent::CacheChanged { revision, count });
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════
// Load & refresh
// ═══════════════════════════════════════════════════════════

impl Panel {
    /// Startup: check configuration, load once, then start live updates
    /// for the hosted backend.
    pub async fn init(self: &Arc<Self>) {
        if !self.is_configured() {
            tracing::warn!(
                backend = %self.backend,
                error = self.config_error().unwrap_or_default(),
                "Backend not configured; panel stays offline"
            );
            self.set_status(SyncStatus::MissingKeys);
            return;
        }
        self.set_status(SyncStatus::Connecting);

        match self.reload().await {
            Ok(count) => tracing::info!(backend = %self.backend, count, "Initial load complete"),
            Err(e) => {
                tracing::error!(backend = %self.backend, error = %e, "Initial load failed");
                if let Err(e) = self.set_placeholder(Some(LOAD_FAILED_PLACEHOLDER)) {
                    tracing::error!(error = %e, "Placeholder not set");
                }
                return;
            }
        }

        if let Some(realtime) = self.realtime.clone() {
            self.start_live(realtime);
        }
    }

    fn start_live(self: &Arc<Self>, realtime: RealtimeConfig) {
        let (tx, mut rx) = mpsc::channel(16);
        spawn_listener(realtime, tx);
        let panel = Arc::clone(self);
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                panel.on_live_event(event).await;
            }
        });
    }

    /// React to the live-update listener.
    pub async fn on_live_event(&self, event: LiveEvent) {
        match event {
            LiveEvent::Subscribed => {
                tracing::info!("Live updates subscribed");
                self.live.store(true, Ordering::SeqCst);
                self.set_status(SyncStatus::Live);
            }
            LiveEvent::Changed => self.refresh_silently().await,
            LiveEvent::ChannelError(reason) => {
                tracing::warn!(%reason, "Live channel error");
                self.live.store(false, Ordering::SeqCst);
                self.set_status(SyncStatus::ConnectionError);
            }
            LiveEvent::Closed => {
                self.live.store(false, Ordering::SeqCst);
                self.set_status(SyncStatus::ConnectionError);
            }
        }
    }

    /// Fetch everything and replace the cache. The cache is only touched on
    /// success; overlapping reloads leave the one that resolves last.
    pub async fn reload(&self) -> Result<usize, PanelError> {
        let store = self.store()?;
        self.set_status(SyncStatus::Syncing);

        let records = match store.list().await {
            Ok(records) => records,
            Err(e) => {
                self.set_status(SyncStatus::ConnectionError);
                return Err(e.into());
            }
        };

        let count = records.len();
        self.patch_cache(|cache| cache.replace(records))?;
        self.set_placeholder(None)?;
        self.set_status(if self.live.load(Ordering::SeqCst) {
            SyncStatus::Live
        } else {
            SyncStatus::Connected
        });
        tracing::debug!(count, "Cache replaced");
        Ok(count)
    }

    /// The Refresh control: a reload bracketed by the busy state.
    pub async fn refresh(&self) -> Result<usize, PanelError> {
        let _busy = self.refresh.begin();
        self.reload().await.inspect_err(|e| {
            tracing::error!(error = %e, "Refresh failed");
        })
    }

    /// Reload without surfacing failures beyond the log and the status.
    pub async fn refresh_silently(&self) {
        if let Err(e) = self.reload().await {
            tracing::warn!(error = %e, "Silent refresh failed");
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Mutations
// ═══════════════════════════════════════════════════════════

impl Panel {
    pub async fn create(&self, payload: NewHospital) -> Result<Hospital, PanelError> {
        payload.validate()?;
        let payload = payload.normalized();
        let store = self.store()?;

        let record = store.create(&payload).await?;
        self.patch_cache(|cache| cache.prepend(record.clone()))?;
        tracing::info!(id = %record.id, "Record created");
        Ok(record)
    }

    /// Merge `patch` over the record `id`. Serialized with other mutations
    /// of the same id.
    pub async fn update(&self, id: &str, patch: HospitalPatch) -> Result<Hospital, PanelError> {
        if patch.is_empty() {
            return Err(PanelError::EmptyPatch);
        }
        patch.validate()?;
        let patch = patch.normalized();
        let store = self.store()?;

        let _lock = self.locks.acquire(id).await;
        let record = store.update(id, &patch).await?;
        self.patch_cache(|cache| cache.upsert(record.clone()))?;
        tracing::info!(id = %record.id, "Record updated");
        Ok(record)
    }

    pub async fn remove(&self, id: &str) -> Result<(), PanelError> {
        let store = self.store()?;

        let _lock = self.locks.acquire(id).await;
        store.delete(id).await?;
        self.patch_cache(|cache| {
            cache.remove(id);
        })?;
        tracing::info!(%id, "Record deleted");
        Ok(())
    }

    /// The Save control: validate the form, create or update, then reload.
    /// Validation failures never reach the store.
    pub async fn submit(&self, form: &HospitalForm) -> Result<Hospital, PanelError> {
        let _busy = self.save.begin();
        let payload = form.to_payload()?;

        let result = match form.target() {
            SubmitTarget::Create => self.create(payload).await,
            SubmitTarget::Update(id) => self.update(&id, payload.into()).await,
        };

        match result {
            Ok(record) => {
                self.refresh_silently().await;
                Ok(record)
            }
            Err(e) => {
                tracing::error!(error = %e, "Save failed");
                if !matches!(e, PanelError::NotConfigured(_)) {
                    self.set_status(SyncStatus::Error);
                }
                Err(e)
            }
        }
    }

    /// Row delete, after the user confirmed it.
    pub async fn delete_confirmed(&self, id: &str, confirmed: bool) -> Result<(), PanelError> {
        if !confirmed {
            return Err(PanelError::NotConfirmed);
        }
        match self.remove(id).await {
            Ok(()) => {
                self.refresh_silently().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(%id, error = %e, "Delete failed");
                if !matches!(e, PanelError::NotConfigured(_)) {
                    self.set_status(SyncStatus::DeleteFailed);
                }
                Err(e)
            }
        }
    }

    /// Form filled from the cached record `id` (row edit action).
    pub fn edit_form(&self, id: &str) -> Result<Option<HospitalForm>, PanelError> {
        Ok(self.read_cache()?.find(id).map(HospitalForm::from_record))
    }
}

// ═══════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════

impl Panel {
    pub fn render_page(
        &self,
        query: &str,
        form: &HospitalForm,
        alert: Option<&str>,
    ) -> Result<String, PanelError> {
        let (status, placeholder) = {
            let indicator = self.read_indicator()?;
            (indicator.status, indicator.placeholder.clone())
        };
        let cache = self.read_cache()?;
        let body = match placeholder {
            Some(message) => TableBody::Placeholder(message),
            None => TableBody::Rows(filter(cache.get(), query)),
        };

        Ok(render::render_page(&PageView {
            status_label: status.label(),
            status_tone: status.tone(),
            alert,
            form,
            query,
            save: self.save.view(),
            refresh: self.refresh.view(),
            body,
        }))
    }

    /// The `<tbody>` content for `query`.
    pub fn render_rows(&self, query: &str) -> Result<String, PanelError> {
        if let Some(message) = self.placeholder()? {
            return Ok(render::placeholder_row(&message));
        }
        let cache = self.read_cache()?;
        Ok(render::render_rows(&filter(cache.get(), query)))
    }
}
