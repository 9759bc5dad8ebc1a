use std::sync::Arc;

use async_trait::async_trait;
use models::ShoppingListData;
use tokio::sync::RwLock;

use super::ListStore;
use crate::errors::ServiceError;

/// Process-local copy of the collection. Starts empty, lost on restart.
///
/// The lock only covers a single read or write; callers doing
/// load → mutate → save are not serialized against each other.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<ShoppingListData>>,
}

impl InMemoryStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_data(data: ShoppingListData) -> Self {
        Self { inner: Arc::new(RwLock::new(data)) }
    }

    pub async fn snapshot(&self) -> ShoppingListData {
        self.inner.read().await.clone()
    }

    pub async fn replace(&self, data: ShoppingListData) {
        *self.inner.write().await = data;
    }
}

#[async_trait]
impl ListStore for InMemoryStore {
    async fn load(&self) -> Result<ShoppingListData, ServiceError> {
        Ok(self.snapshot().await)
    }

    async fn save(&self, data: ShoppingListData) -> Result<(), ServiceError> {
        self.replace(data).await;
        Ok(())
    }

    fn backend(&self) -> &'static str { "memory" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::ShoppingItem;

    #[tokio::test]
    async fn starts_empty_and_keeps_last_write() -> Result<(), anyhow::Error> {
        let store = InMemoryStore::new();
        assert!(store.load().await?.items.is_empty());

        let data = ShoppingListData {
            items: vec![ShoppingItem {
                id: "1".into(),
                name: "Apples".into(),
                quantity: 3,
                description: None,
                completed: false,
                created_at: "2024-01-01T00:00:00.000Z".into(),
            }],
        };
        store.save(data.clone()).await?;

        // clones share the same copy
        let other = store.clone();
        assert_eq!(other.load().await?, data);

        // save(load()) leaves the collection unchanged
        let loaded = store.load().await?;
        store.save(loaded).await?;
        assert_eq!(store.load().await?, data);
        Ok(())
    }
}
