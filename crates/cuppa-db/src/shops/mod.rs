//! Database operations for the `shops` table.

mod read;
mod types;
mod write;

pub use read::{get_shop_by_external_id, get_shop_by_public_id};
pub use types::ShopRow;
pub use write::insert_shop;
