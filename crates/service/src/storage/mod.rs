//! Storage abstractions for the shopping list
//!
//! The whole `ShoppingListData` is the unit of persistence: `load` returns the
//! full collection and `save` overwrites it. There are no partial writes.

pub mod diagnostics;
pub mod gateway;
pub mod json_file_store;
pub mod memory;
pub mod remote;

use async_trait::async_trait;
use models::ShoppingListData;

use crate::errors::ServiceError;

pub use diagnostics::{DiagnosticSink, RecordingDiagnostics, StorageEvent, TracingDiagnostics};
pub use gateway::PersistenceGateway;
pub use json_file_store::JsonFileStore;
pub use memory::InMemoryStore;
pub use remote::{RedisRemote, RemoteStore, StoreError};

/// Whole-collection persistence.
#[async_trait]
pub trait ListStore: Send + Sync {
    async fn load(&self) -> Result<ShoppingListData, ServiceError>;
    async fn save(&self, data: ShoppingListData) -> Result<(), ServiceError>;

    /// Short backend label used in logs.
    fn backend(&self) -> &'static str;
}
