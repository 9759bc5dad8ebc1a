pub mod errors;
pub mod shopping_item;

pub use shopping_item::{ItemPatch, NewItem, ShoppingItem, ShoppingListData};
