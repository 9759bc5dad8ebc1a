use std::sync::Mutex;

use tracing::{error, warn};

use crate::metrics::STORAGE_DEGRADED_TOTAL;

/// A remote-store failure that was masked instead of surfaced to the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageEvent {
    /// The connection could not be established; the in-process copy is used.
    RemoteConnectFailed { error: String },
    /// A read command failed; the in-process copy is served.
    RemoteReadFailed { key: String, error: String },
    /// The key does not exist yet; the in-process copy is served.
    RemoteKeyMissing { key: String },
    /// The stored blob is not a valid collection; the in-process copy is served.
    RemoteDecodeFailed { key: String, error: String },
    /// A write failed; the in-process copy already holds the new value.
    RemoteWriteFailed { key: String, error: String },
}

impl StorageEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            StorageEvent::RemoteConnectFailed { .. } => "remote_connect_failed",
            StorageEvent::RemoteReadFailed { .. } => "remote_read_failed",
            StorageEvent::RemoteKeyMissing { .. } => "remote_key_missing",
            StorageEvent::RemoteDecodeFailed { .. } => "remote_decode_failed",
            StorageEvent::RemoteWriteFailed { .. } => "remote_write_failed",
        }
    }
}

/// Receiver of degraded-mode events emitted by the persistence gateway.
pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, event: StorageEvent);
}

/// Default sink: structured log line plus a Prometheus counter.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn emit(&self, event: StorageEvent) {
        STORAGE_DEGRADED_TOTAL.with_label_values(&[event.kind()]).inc();
        match &event {
            StorageEvent::RemoteConnectFailed { error } => {
                error!(event = event.kind(), %error, "redis connection failed; serving in-process copy");
            }
            StorageEvent::RemoteReadFailed { key, error } | StorageEvent::RemoteDecodeFailed { key, error } => {
                warn!(event = event.kind(), %key, %error, "redis read degraded; serving in-process copy");
            }
            StorageEvent::RemoteKeyMissing { key } => {
                warn!(event = event.kind(), %key, "redis key absent; serving in-process copy");
            }
            StorageEvent::RemoteWriteFailed { key, error } => {
                error!(event = event.kind(), %key, %error, "redis write dropped; in-process copy kept");
            }
        }
    }
}

/// Sink that keeps every event in memory, for assertions.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<StorageEvent>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self { Self::default() }

    pub fn events(&self) -> Vec<StorageEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn count(&self, kind: &str) -> usize {
        self.events().iter().filter(|e| e.kind() == kind).count()
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn emit(&self, event: StorageEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_counts_by_kind() {
        let sink = RecordingDiagnostics::new();
        sink.emit(StorageEvent::RemoteKeyMissing { key: "shopping-list".into() });
        sink.emit(StorageEvent::RemoteWriteFailed { key: "shopping-list".into(), error: "broken pipe".into() });
        sink.emit(StorageEvent::RemoteWriteFailed { key: "shopping-list".into(), error: "broken pipe".into() });
        assert_eq!(sink.events().len(), 3);
        assert_eq!(sink.count("remote_write_failed"), 2);
        assert_eq!(sink.count("remote_read_failed"), 0);
    }

    #[test]
    fn tracing_sink_bumps_counter() {
        let before = STORAGE_DEGRADED_TOTAL.with_label_values(&["remote_connect_failed"]).get();
        TracingDiagnostics.emit(StorageEvent::RemoteConnectFailed { error: "refused".into() });
        let after = STORAGE_DEGRADED_TOTAL.with_label_values(&["remote_connect_failed"]).get();
        assert!(after > before);
    }
}
