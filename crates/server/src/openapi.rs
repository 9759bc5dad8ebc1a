use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItemDoc {
    pub id: String,
    pub name: String,
    pub quantity: i64,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: String,
}

#[derive(ToSchema)]
pub struct ShoppingListDoc { pub items: Vec<ShoppingItemDoc> }

#[derive(ToSchema)]
pub struct NewItemDoc {
    pub name: String,
    pub quantity: Option<i64>,
    pub description: Option<String>,
}

#[derive(ToSchema)]
pub struct UpdateItemDoc {
    pub id: String,
    pub name: Option<String>,
    pub quantity: Option<i64>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

#[derive(ToSchema)]
pub struct MessageDoc { pub message: String }

#[derive(ToSchema)]
pub struct ErrorDoc { pub error: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::shopping_list::list,
        crate::routes::shopping_list::add,
        crate::routes::shopping_list::update,
        crate::routes::shopping_list::delete,
        crate::routes::shopping_list::clear_all,
        crate::routes::shopping_list::clear_completed,
    ),
    components(
        schemas(
            HealthResponse,
            ShoppingItemDoc,
            ShoppingListDoc,
            NewItemDoc,
            UpdateItemDoc,
            MessageDoc,
            ErrorDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "shopping-list")
    )
)]
pub struct ApiDoc;
