use std::path::PathBuf;

use async_trait::async_trait;
use models::ShoppingListData;
use tokio::fs;

use super::ListStore;
use crate::errors::ServiceError;

/// JSON file-backed store for the whole collection.
///
/// Every `load` reads the file and every `save` rewrites it. There is no
/// locking: concurrent writers race and the last write wins.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    file_path: PathBuf,
}

impl JsonFileStore {
    /// Initialize the store from a path. Creates the directory and an empty collection file if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Self, ServiceError> {
        let store = Self { file_path: path.into() };
        store.ensure_file().await?;
        Ok(store)
    }

    async fn ensure_file(&self) -> Result<(), ServiceError> {
        if fs::try_exists(&self.file_path).await.unwrap_or(false) {
            return Ok(());
        }
        common::env::ensure_data_dir(&self.file_path)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        self.write(&ShoppingListData::default()).await
    }

    async fn write(&self, data: &ShoppingListData) -> Result<(), ServiceError> {
        let raw = data.to_json()?;
        fs::write(&self.file_path, raw).await.map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ListStore for JsonFileStore {
    async fn load(&self) -> Result<ShoppingListData, ServiceError> {
        self.ensure_file().await?;
        let raw = fs::read_to_string(&self.file_path)
            .await
            .map_err(|e| ServiceError::Storage(e.to_string()))?;
        Ok(ShoppingListData::from_json(&raw)?)
    }

    async fn save(&self, data: ShoppingListData) -> Result<(), ServiceError> {
        self.write(&data).await
    }

    fn backend(&self) -> &'static str { "file" }
}
