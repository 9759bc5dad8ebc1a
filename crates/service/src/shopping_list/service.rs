use std::sync::Arc;

use chrono::{DateTime, Utc};
use models::{ItemPatch, NewItem, ShoppingItem, ShoppingListData};
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::metrics::record_operation;
use crate::storage::ListStore;

/// Shopping list operations, independent of the web framework.
///
/// Every operation loads the whole collection, changes it in memory and saves
/// it back. Nothing serializes concurrent calls: the last `save` wins.
pub struct ShoppingListService<S: ListStore + ?Sized> {
    store: Arc<S>,
}

impl<S: ListStore + ?Sized> Clone for ShoppingListService<S> {
    fn clone(&self) -> Self { Self { store: Arc::clone(&self.store) } }
}

impl<S: ListStore + ?Sized> ShoppingListService<S> {
    pub fn new(store: Arc<S>) -> Self { Self { store } }

    #[instrument(skip(self), fields(backend = self.store.backend()))]
    pub async fn list(&self) -> Result<ShoppingListData, ServiceError> {
        record_operation("list");
        self.store.load().await
    }

    /// Append a new item built from `input` and return it.
    ///
    /// # Examples
    /// ```
    /// use service::{ShoppingListService, storage::InMemoryStore};
    /// use models::NewItem;
    /// use std::sync::Arc;
    /// let svc = ShoppingListService::new(Arc::new(InMemoryStore::new()));
    /// let input = NewItem { name: "Milk".into(), quantity: None, description: None };
    /// let item = tokio_test::block_on(svc.add(input)).unwrap();
    /// assert_eq!(item.quantity, 1);
    /// assert!(!item.completed);
    /// ```
    pub async fn add(&self, input: NewItem) -> Result<ShoppingItem, ServiceError> {
        self.add_at(input, Utc::now()).await
    }

    #[instrument(skip(self, input), fields(name = %input.name, backend = self.store.backend()))]
    pub async fn add_at(&self, input: NewItem, now: DateTime<Utc>) -> Result<ShoppingItem, ServiceError> {
        record_operation("add");
        let mut data = self.store.load().await?;
        let item = input.into_item(now);
        data.items.push(item.clone());
        self.store.save(data).await?;
        info!(id = %item.id, "item_added");
        Ok(item)
    }

    /// Merge `patch` onto the item with `id`. Unknown ids are `NotFound` and nothing is saved.
    #[instrument(skip(self, patch), fields(backend = self.store.backend()))]
    pub async fn update(&self, id: &str, patch: ItemPatch) -> Result<ShoppingItem, ServiceError> {
        record_operation("update");
        let mut data = self.store.load().await?;
        let Some(item) = data.find_mut(id) else {
            return Err(ServiceError::not_found("item"));
        };
        patch.apply(item);
        let updated = item.clone();
        self.store.save(data).await?;
        info!(id = %updated.id, completed = updated.completed, "item_updated");
        Ok(updated)
    }

    /// Remove items with `id`; a missing match is not an error. Returns how many were removed.
    #[instrument(skip(self), fields(backend = self.store.backend()))]
    pub async fn delete(&self, id: &str) -> Result<usize, ServiceError> {
        if id.is_empty() {
            return Err(ServiceError::Validation("id is required".into()));
        }
        record_operation("delete");
        let mut data = self.store.load().await?;
        let removed = data.remove(id);
        self.store.save(data).await?;
        info!(removed, "item_deleted");
        Ok(removed)
    }

    #[instrument(skip(self), fields(backend = self.store.backend()))]
    pub async fn clear_all(&self) -> Result<usize, ServiceError> {
        record_operation("clear_all");
        let data = self.store.load().await?;
        let removed = data.items.len();
        self.store.save(ShoppingListData::default()).await?;
        info!(removed, "list_cleared");
        Ok(removed)
    }

    #[instrument(skip(self), fields(backend = self.store.backend()))]
    pub async fn clear_completed(&self) -> Result<usize, ServiceError> {
        record_operation("clear_completed");
        let mut data = self.store.load().await?;
        let removed = data.remove_completed();
        self.store.save(data).await?;
        info!(removed, "completed_cleared");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryStore;

    fn item(id: &str, completed: bool) -> ShoppingItem {
        ShoppingItem {
            id: id.into(),
            name: format!("item-{id}"),
            quantity: 2,
            description: Some("note".into()),
            completed,
            created_at: "2024-01-01T00:00:00.000Z".into(),
        }
    }

    fn service_with(items: Vec<ShoppingItem>) -> ShoppingListService<InMemoryStore> {
        let store = InMemoryStore::with_data(ShoppingListData { items });
        ShoppingListService::new(Arc::new(store))
    }

    #[tokio::test]
    async fn add_appends_exactly_one_item_with_defaults() -> Result<(), anyhow::Error> {
        let svc = service_with(vec![item("a", false)]);
        let created = svc
            .add(NewItem { name: "Bread".into(), quantity: None, description: None })
            .await?;
        assert!(!created.id.is_empty());
        assert_eq!(created.quantity, 1);
        assert!(!created.completed);

        let list = svc.list().await?;
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.items.last(), Some(&created));
        Ok(())
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found_and_changes_nothing() -> Result<(), anyhow::Error> {
        let svc = service_with(vec![item("a", false)]);
        let before = svc.list().await?;
        let res = svc.update("zzz", ItemPatch { completed: Some(true), ..Default::default() }).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        assert_eq!(svc.list().await?, before);
        Ok(())
    }

    #[tokio::test]
    async fn update_completed_only_touches_that_field() -> Result<(), anyhow::Error> {
        let svc = service_with(vec![item("a", false), item("b", false)]);
        let updated = svc.update("a", ItemPatch { completed: Some(true), ..Default::default() }).await?;
        let mut expected = item("a", false);
        expected.completed = true;
        assert_eq!(updated, expected);
        assert_eq!(svc.list().await?.items, vec![expected, item("b", false)]);
        Ok(())
    }

    #[tokio::test]
    async fn delete_requires_id_and_ignores_unknown_ids() -> Result<(), anyhow::Error> {
        let svc = service_with(vec![item("a", false), item("b", true)]);
        assert!(matches!(svc.delete("").await, Err(ServiceError::Validation(_))));
        assert_eq!(svc.list().await?.items.len(), 2);

        assert_eq!(svc.delete("missing").await?, 0);
        assert_eq!(svc.list().await?.items.len(), 2);

        assert_eq!(svc.delete("a").await?, 1);
        assert_eq!(svc.list().await?.items, vec![item("b", true)]);
        Ok(())
    }

    #[tokio::test]
    async fn clear_completed_keeps_open_items() -> Result<(), anyhow::Error> {
        let svc = service_with(vec![item("a", false), item("b", true), item("c", true)]);
        assert_eq!(svc.clear_completed().await?, 2);
        assert_eq!(svc.list().await?.items, vec![item("a", false)]);
        Ok(())
    }

    #[tokio::test]
    async fn clear_all_empties_the_list() -> Result<(), anyhow::Error> {
        let svc = service_with(vec![item("a", false), item("b", true)]);
        assert_eq!(svc.clear_all().await?, 2);
        assert!(svc.list().await?.items.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn works_behind_a_trait_object() -> Result<(), anyhow::Error> {
        let store: Arc<dyn ListStore> = Arc::new(InMemoryStore::new());
        let svc = ShoppingListService::new(store);
        svc.add(NewItem { name: "Tea".into(), quantity: Some(3), description: Some("green".into()) }).await?;
        let items = svc.list().await?.items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 3);
        assert_eq!(items[0].description.as_deref(), Some("green"));
        Ok(())
    }
}
