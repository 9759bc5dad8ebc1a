use axum::{
    extract::{rejection::JsonRejection, Query, State},
    Json,
};
use common::types::MessageBody;
use models::{ItemPatch, NewItem, ShoppingItem, ShoppingListData};
use serde::{Deserialize, Serialize};
use service::{ListStore, ShoppingListService};
use tracing::info;

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct AppState {
    pub list_svc: ShoppingListService<dyn ListStore>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteQuery {
    /// Id of the item to remove
    pub id: Option<String>,
}

/// PUT body: the target id plus any fields to overwrite.
#[derive(Debug, Deserialize, Serialize)]
pub struct UpdateItemInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(flatten)]
    pub patch: ItemPatch,
}

#[utoipa::path(
    get, path = "/shopping-list", tag = "shopping-list",
    responses(
        (status = 200, description = "Whole collection", body = crate::openapi::ShoppingListDoc),
        (status = 500, description = "Load Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn list(State(state): State<AppState>) -> Result<Json<ShoppingListData>, JsonApiError> {
    let data = state
        .list_svc
        .list()
        .await
        .map_err(|e| JsonApiError::internal("Failed to load the shopping list", e))?;
    Ok(Json(data))
}

#[utoipa::path(
    post, path = "/shopping-list", tag = "shopping-list",
    request_body = crate::openapi::NewItemDoc,
    responses(
        (status = 200, description = "Created item", body = crate::openapi::ShoppingItemDoc),
        (status = 500, description = "Add Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn add(
    State(state): State<AppState>,
    payload: Result<Json<NewItem>, JsonRejection>,
) -> Result<Json<ShoppingItem>, JsonApiError> {
    const FAILED: &str = "Failed to add item";
    let Json(input) = payload.map_err(|e| JsonApiError::internal(FAILED, e.body_text()))?;
    let item = state
        .list_svc
        .add(input)
        .await
        .map_err(|e| JsonApiError::from_service(e, FAILED))?;
    Ok(Json(item))
}

#[utoipa::path(
    put, path = "/shopping-list", tag = "shopping-list",
    request_body = crate::openapi::UpdateItemDoc,
    responses(
        (status = 200, description = "Updated item", body = crate::openapi::ShoppingItemDoc),
        (status = 404, description = "Not Found", body = crate::openapi::MessageDoc),
        (status = 500, description = "Update Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn update(
    State(state): State<AppState>,
    payload: Result<Json<UpdateItemInput>, JsonRejection>,
) -> Result<Json<ShoppingItem>, JsonApiError> {
    const FAILED: &str = "Failed to update item";
    let Json(input) = payload.map_err(|e| JsonApiError::internal(FAILED, e.body_text()))?;
    let Some(id) = input.id else {
        return Err(JsonApiError::not_found());
    };
    let item = state
        .list_svc
        .update(&id, input.patch)
        .await
        .map_err(|e| JsonApiError::from_service(e, FAILED))?;
    Ok(Json(item))
}

#[utoipa::path(
    delete, path = "/shopping-list", tag = "shopping-list",
    params(DeleteQuery),
    responses(
        (status = 200, description = "Deleted (also when no item matched)", body = crate::openapi::MessageDoc),
        (status = 400, description = "Missing id", body = crate::openapi::MessageDoc),
        (status = 500, description = "Delete Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn delete(
    State(state): State<AppState>,
    Query(q): Query<DeleteQuery>,
) -> Result<Json<MessageBody>, JsonApiError> {
    let Some(id) = q.id.filter(|id| !id.is_empty()) else {
        return Err(JsonApiError::missing_id());
    };
    let removed = state
        .list_svc
        .delete(&id)
        .await
        .map_err(|e| JsonApiError::from_service(e, "Failed to delete item"))?;
    info!(%id, removed, "delete request served");
    Ok(Json(MessageBody::new("Item deleted")))
}

#[utoipa::path(
    delete, path = "/shopping-list/clear", tag = "shopping-list",
    responses(
        (status = 200, description = "All items removed", body = crate::openapi::MessageDoc),
        (status = 500, description = "Clear Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn clear_all(State(state): State<AppState>) -> Result<Json<MessageBody>, JsonApiError> {
    state
        .list_svc
        .clear_all()
        .await
        .map_err(|e| JsonApiError::internal("Failed to delete all items", e))?;
    Ok(Json(MessageBody::new("All items deleted")))
}

#[utoipa::path(
    delete, path = "/shopping-list/clear-completed", tag = "shopping-list",
    responses(
        (status = 200, description = "Completed items removed", body = crate::openapi::MessageDoc),
        (status = 500, description = "Clear Failed", body = crate::openapi::ErrorDoc)
    )
)]
pub async fn clear_completed(State(state): State<AppState>) -> Result<Json<MessageBody>, JsonApiError> {
    state
        .list_svc
        .clear_completed()
        .await
        .map_err(|e| JsonApiError::internal("Failed to delete completed items", e))?;
    Ok(Json(MessageBody::new("Completed items deleted")))
}
