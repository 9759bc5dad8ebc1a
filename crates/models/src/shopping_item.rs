use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// One entry of the shopping list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: String,
}

/// The whole collection; always read and written as one value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ShoppingListData {
    #[serde(default)]
    pub items: Vec<ShoppingItem>,
}

impl ShoppingListData {
    pub fn from_json(raw: &str) -> Result<Self, ModelError> {
        serde_json::from_str(raw).map_err(ModelError::Decode)
    }

    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string(self).map_err(ModelError::Encode)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut ShoppingItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Remove every item with the given id; returns how many were dropped.
    pub fn remove(&mut self, id: &str) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        before - self.items.len()
    }

    /// Keep only items that are not completed; returns how many were dropped.
    pub fn remove_completed(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| !item.completed);
        before - self.items.len()
    }
}

/// Body of an add request.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct NewItem {
    pub name: String,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

impl NewItem {
    /// Build the stored item. Zero or missing quantity becomes 1, missing description becomes "".
    pub fn into_item(self, now: DateTime<Utc>) -> ShoppingItem {
        let quantity = match self.quantity {
            Some(q) if q != 0 => q,
            _ => 1,
        };
        ShoppingItem {
            id: now.timestamp_millis().to_string(),
            name: self.name,
            quantity,
            description: Some(self.description.unwrap_or_default()),
            completed: false,
            created_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Fields an update may overwrite. `id` and `createdAt` are not part of it.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl ItemPatch {
    /// Shallow merge: present fields win, absent ones keep the stored value.
    pub fn apply(self, item: &mut ShoppingItem) {
        if let Some(name) = self.name {
            item.name = name;
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(description) = self.description {
            item.description = Some(description);
        }
        if let Some(completed) = self.completed {
            item.completed = completed;
        }
    }
}
