//! Runtime wiring
//!
//! Builds the configured `ListStore` once at startup so handlers receive it by
//! injection instead of reaching for module-level state.

use std::sync::Arc;

use configs::{StorageBackend, StorageConfig};
use tracing::{info, warn};

use crate::storage::{
    DiagnosticSink, InMemoryStore, JsonFileStore, ListStore, PersistenceGateway, RedisRemote, StorageEvent,
    TracingDiagnostics,
};

/// Build the store selected by `cfg`.
///
/// - `file`: a `JsonFileStore` at `cfg.file_path`.
/// - `memory`: the persistence gateway; Redis is attached only when a URL is
///   configured and production mode is on. A failed initial connection is
///   reported and retried on first use, it does not abort startup.
pub async fn build_store(cfg: &StorageConfig) -> anyhow::Result<Arc<dyn ListStore>> {
    build_store_with(cfg, Arc::new(TracingDiagnostics)).await
}

pub async fn build_store_with(
    cfg: &StorageConfig,
    diagnostics: Arc<dyn DiagnosticSink>,
) -> anyhow::Result<Arc<dyn ListStore>> {
    match cfg.backend {
        StorageBackend::File => {
            let store = JsonFileStore::new(&cfg.file_path).await?;
            info!(event = "storage_ready", backend = "file", path = %cfg.file_path, "json file store ready");
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            let local = InMemoryStore::new();
            let url = match &cfg.redis_url {
                Some(url) if cfg.production => url,
                Some(_) => {
                    warn!(event = "storage_ready", backend = "memory", "REDIS_URL set but not in production mode; data is kept in-process only");
                    return Ok(Arc::new(PersistenceGateway::local_only(local).with_diagnostics(diagnostics)));
                }
                None => {
                    info!(event = "storage_ready", backend = "memory", "no redis configured; data is kept in-process only");
                    return Ok(Arc::new(PersistenceGateway::local_only(local).with_diagnostics(diagnostics)));
                }
            };

            let remote = RedisRemote::open(url)?;
            if let Err(e) = remote.connect().await {
                diagnostics.emit(StorageEvent::RemoteConnectFailed { error: e.to_string() });
            }
            info!(event = "storage_ready", backend = "redis", key = %cfg.redis_key, "redis-backed gateway ready");
            let gateway = PersistenceGateway::with_remote(local, Arc::new(remote), cfg.redis_key.clone())
                .with_diagnostics(diagnostics);
            Ok(Arc::new(gateway))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::RecordingDiagnostics;

    #[tokio::test]
    async fn default_config_builds_in_process_store() -> Result<(), anyhow::Error> {
        let store = build_store(&StorageConfig::default()).await?;
        assert_eq!(store.backend(), "memory");
        Ok(())
    }

    #[tokio::test]
    async fn redis_without_production_stays_in_process() -> Result<(), anyhow::Error> {
        let cfg = StorageConfig { redis_url: Some("redis://127.0.0.1:1".into()), ..Default::default() };
        let store = build_store(&cfg).await?;
        assert_eq!(store.backend(), "memory");
        Ok(())
    }

    #[tokio::test]
    async fn unreachable_redis_does_not_abort_startup() -> Result<(), anyhow::Error> {
        let cfg = StorageConfig {
            redis_url: Some("redis://127.0.0.1:1".into()),
            production: true,
            ..Default::default()
        };
        let sink = Arc::new(RecordingDiagnostics::new());
        let store = build_store_with(&cfg, sink.clone()).await?;
        assert_eq!(store.backend(), "redis");
        assert_eq!(sink.count("remote_connect_failed"), 1);

        // reads degrade to the (empty) in-process copy
        assert!(store.load().await?.items.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn file_backend_creates_its_file() -> Result<(), anyhow::Error> {
        let path = std::env::temp_dir()
            .join(format!("runtime_store_{}", uuid::Uuid::new_v4()))
            .join("shopping-list.json");
        let cfg = StorageConfig {
            backend: StorageBackend::File,
            file_path: path.to_string_lossy().into_owned(),
            ..Default::default()
        };
        let store = build_store(&cfg).await?;
        assert_eq!(store.backend(), "file");
        assert!(tokio::fs::metadata(&path).await.is_ok());
        let _ = tokio::fs::remove_dir_all(path.parent().unwrap()).await;
        Ok(())
    }
}
