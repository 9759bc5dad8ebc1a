use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Client,
};
use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::info;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);
/// After a failed connect, calls fail immediately until this window has passed.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(10);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid redis url: {0}")]
    InvalidUrl(String),
    #[error("connection error: {0}")]
    Connect(String),
    #[error("command error: {0}")]
    Command(String),
}

/// Minimal key-value surface the gateway needs from a remote store.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Redis-backed remote store.
///
/// Built once at startup and shared. The connection is opened on `connect`
/// (or first use if that failed) and reused afterwards; `ConnectionManager`
/// reconnects on its own once established. While no connection exists, a
/// failed attempt makes every call fail fast for `RECONNECT_BACKOFF`.
pub struct RedisRemote {
    client: Client,
    conn: OnceCell<ConnectionManager>,
    last_failure: Mutex<Option<Instant>>,
    backoff: Duration,
}

impl RedisRemote {
    pub fn open(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url).map_err(|e| StoreError::InvalidUrl(e.to_string()))?;
        Ok(Self { client, conn: OnceCell::new(), last_failure: Mutex::new(None), backoff: RECONNECT_BACKOFF })
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Establish the shared connection now instead of on first use.
    pub async fn connect(&self) -> Result<(), StoreError> {
        self.connection().await.map(|_| ())
    }

    fn in_backoff(&self) -> bool {
        self.last_failure
            .lock()
            .ok()
            .and_then(|failed| *failed)
            .is_some_and(|at| at.elapsed() < self.backoff)
    }

    fn record_failure(&self, failed: Option<Instant>) {
        if let Ok(mut last) = self.last_failure.lock() {
            *last = failed;
        }
    }

    async fn connection(&self) -> Result<ConnectionManager, StoreError> {
        if let Some(manager) = self.conn.get() {
            return Ok(manager.clone());
        }
        if self.in_backoff() {
            return Err(StoreError::Connect("redis unavailable; waiting before the next connect attempt".into()));
        }
        let manager = self
            .conn
            .get_or_try_init(|| async {
                // 建连失败只重试一次
                let config = ConnectionManagerConfig::new()
                    .set_number_of_retries(1)
                    .set_connection_timeout(CONNECT_TIMEOUT);
                let manager = ConnectionManager::new_with_config(self.client.clone(), config)
                    .await
                    .map_err(|e| {
                        self.record_failure(Some(Instant::now()));
                        StoreError::Connect(e.to_string())
                    })?;
                self.record_failure(None);
                info!(event = "redis_connected", "redis connection established");
                Ok::<_, StoreError>(manager)
            })
            .await?;
        Ok(manager.clone())
    }
}

#[async_trait]
impl RemoteStore for RedisRemote {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| StoreError::Command(e.to_string()))
    }
}

/// In-memory remote for tests and local experiments.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct MockRemote {
        values: Mutex<HashMap<String, String>>,
        unreachable: AtomicBool,
        read_only: AtomicBool,
    }

    impl MockRemote {
        pub fn new() -> Self { Self::default() }

        /// While set, every call fails with a connection error.
        pub fn set_unreachable(&self, down: bool) {
            self.unreachable.store(down, Ordering::SeqCst);
        }

        /// While set, writes fail with a command error and reads keep working.
        pub fn set_read_only(&self, read_only: bool) {
            self.read_only.store(read_only, Ordering::SeqCst);
        }

        pub fn raw(&self, key: &str) -> Option<String> {
            self.values.lock().ok().and_then(|m| m.get(key).cloned())
        }

        pub fn put_raw(&self, key: &str, value: &str) {
            if let Ok(mut m) = self.values.lock() {
                m.insert(key.to_string(), value.to_string());
            }
        }

        fn check(&self) -> Result<(), StoreError> {
            if self.unreachable.load(Ordering::SeqCst) {
                return Err(StoreError::Connect("connection refused".into()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RemoteStore for MockRemote {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            self.check()?;
            Ok(self.raw(key))
        }

        async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
            self.check()?;
            if self.read_only.load(Ordering::SeqCst) {
                return Err(StoreError::Command("READONLY You can't write against a read only replica.".into()));
            }
            self.put_raw(key, value);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_rejects_malformed_url() {
        assert!(matches!(RedisRemote::open("not a url"), Err(StoreError::InvalidUrl(_))));
    }

    #[tokio::test]
    async fn failed_connect_fails_fast_during_backoff() {
        let remote = RedisRemote::open("redis://127.0.0.1:1").unwrap().with_backoff(Duration::from_secs(60));
        assert!(matches!(remote.connect().await, Err(StoreError::Connect(_))));

        let started = Instant::now();
        let err = remote.get("shopping-list").await.unwrap_err();
        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(err.to_string().contains("waiting before the next connect attempt"));
        assert!(matches!(remote.set("shopping-list", "{}").await, Err(StoreError::Connect(_))));
    }

    #[tokio::test]
    async fn connect_is_attempted_again_after_backoff() {
        let remote = RedisRemote::open("redis://127.0.0.1:1").unwrap().with_backoff(Duration::ZERO);
        assert!(remote.connect().await.is_err());
        let err = remote.connect().await.unwrap_err();
        assert!(!err.to_string().contains("waiting before the next connect attempt"));
    }

    #[tokio::test]
    async fn redis_round_trip_when_available() -> Result<(), anyhow::Error> {
        // 仅在提供 REDIS_URL 时运行
        let Ok(url) = std::env::var("REDIS_URL") else {
            eprintln!("REDIS_URL missing; skip redis test");
            return Ok(());
        };
        let remote = RedisRemote::open(&url)?;
        remote.connect().await?;
        let key = format!("shopping-list-test-{}", uuid::Uuid::new_v4());
        assert_eq!(remote.get(&key).await?, None);
        remote.set(&key, r#"{"items":[]}"#).await?;
        assert_eq!(remote.get(&key).await?.as_deref(), Some(r#"{"items":[]}"#));
        Ok(())
    }

    #[tokio::test]
    async fn mock_remote_fails_while_unreachable() {
        let remote = mock::MockRemote::new();
        remote.set("k", "v").await.unwrap();
        remote.set_unreachable(true);
        assert!(matches!(remote.get("k").await, Err(StoreError::Connect(_))));
        remote.set_unreachable(false);
        assert_eq!(remote.get("k").await.unwrap().as_deref(), Some("v"));
    }
}
