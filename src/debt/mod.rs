//! Standing debts: the data model and the CRUD endpoints.

pub(crate) mod core;
mod endpoints;
pub(crate) mod form;

pub use endpoints::{
    create_debt_endpoint, delete_debt_endpoint, list_debts_endpoint, update_debt_endpoint,
};
pub use self::core::{Debt, DebtType};

pub(crate) use self::core::{create_debt_table, get_total_debt};
