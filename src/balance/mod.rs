//! Balance items: account reconciliation entries and their CRUD endpoints.

pub(crate) mod core;
mod endpoints;
pub(crate) mod form;

pub use endpoints::{
    create_balance_item_endpoint, delete_balance_item_endpoint, list_balance_items_endpoint,
    update_balance_item_endpoint,
};
pub use self::core::{BalanceItem, BalanceType};

pub(crate) use self::core::create_balance_item_table;
