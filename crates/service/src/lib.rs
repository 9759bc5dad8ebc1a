//! Service layer for the shopping list.
//! - `storage`: whole-collection persistence (in-process copy, Redis mirror, JSON file).
//! - `shopping_list`: list/add/update/delete/clear operations on top of a `ListStore`.
//! - `runtime`: wires the configured backend at startup.

pub mod errors;
pub mod metrics;
pub mod runtime;
pub mod shopping_list;
pub mod storage;

pub use shopping_list::service::ShoppingListService;
pub use storage::ListStore;
