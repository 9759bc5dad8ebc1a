use std::sync::Arc;

use async_trait::async_trait;
use models::ShoppingListData;
use tracing::debug;

use super::diagnostics::{DiagnosticSink, StorageEvent, TracingDiagnostics};
use super::memory::InMemoryStore;
use super::remote::{RemoteStore, StoreError};
use super::ListStore;
use crate::errors::ServiceError;

struct RemoteBinding {
    store: Arc<dyn RemoteStore>,
    key: String,
}

/// Resolves the collection to the in-process copy, optionally mirrored to a remote store.
///
/// With a remote attached, `load` prefers the remote blob and falls back to the
/// in-process copy on any failure; `save` always updates the in-process copy
/// first and then writes the remote, dropping remote errors. Remote failures
/// never reach the caller, they are reported to the `DiagnosticSink`.
pub struct PersistenceGateway {
    local: InMemoryStore,
    remote: Option<RemoteBinding>,
    diagnostics: Arc<dyn DiagnosticSink>,
}

impl PersistenceGateway {
    /// Development mode: the in-process copy only.
    pub fn local_only(local: InMemoryStore) -> Self {
        Self { local, remote: None, diagnostics: Arc::new(TracingDiagnostics) }
    }

    /// Production mode: in-process copy mirrored to `key` on the remote store.
    pub fn with_remote(local: InMemoryStore, remote: Arc<dyn RemoteStore>, key: impl Into<String>) -> Self {
        Self {
            local,
            remote: Some(RemoteBinding { store: remote, key: key.into() }),
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn is_remote_enabled(&self) -> bool { self.remote.is_some() }

    fn read_failure(key: &str, err: StoreError) -> StorageEvent {
        match err {
            StoreError::Connect(error) | StoreError::InvalidUrl(error) => StorageEvent::RemoteConnectFailed { error },
            StoreError::Command(error) => StorageEvent::RemoteReadFailed { key: key.to_string(), error },
        }
    }

    fn write_failure(key: &str, err: StoreError) -> StorageEvent {
        match err {
            StoreError::Connect(error) | StoreError::InvalidUrl(error) => StorageEvent::RemoteConnectFailed { error },
            StoreError::Command(error) => StorageEvent::RemoteWriteFailed { key: key.to_string(), error },
        }
    }
}

#[async_trait]
impl ListStore for PersistenceGateway {
    async fn load(&self) -> Result<ShoppingListData, ServiceError> {
        if let Some(remote) = &self.remote {
            let event = match remote.store.get(&remote.key).await {
                Ok(Some(raw)) => match ShoppingListData::from_json(&raw) {
                    Ok(data) => {
                        // 本地副本只由 save 修改
                        debug!(key = %remote.key, items = data.items.len(), "loaded collection from redis");
                        return Ok(data);
                    }
                    Err(e) => StorageEvent::RemoteDecodeFailed { key: remote.key.clone(), error: e.to_string() },
                },
                Ok(None) => StorageEvent::RemoteKeyMissing { key: remote.key.clone() },
                Err(e) => Self::read_failure(&remote.key, e),
            };
            self.diagnostics.emit(event);
        }
        Ok(self.local.snapshot().await)
    }

    async fn save(&self, data: ShoppingListData) -> Result<(), ServiceError> {
        let Some(remote) = &self.remote else {
            self.local.replace(data).await;
            return Ok(());
        };

        let encoded = data.to_json();
        self.local.replace(data).await;

        let raw = match encoded {
            Ok(raw) => raw,
            Err(e) => {
                self.diagnostics.emit(StorageEvent::RemoteWriteFailed { key: remote.key.clone(), error: e.to_string() });
                return Ok(());
            }
        };
        if let Err(e) = remote.store.set(&remote.key, &raw).await {
            self.diagnostics.emit(Self::write_failure(&remote.key, e));
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        if self.is_remote_enabled() { "redis" } else { "memory" }
    }
}
