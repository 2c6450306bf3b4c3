//! The API endpoint URIs.

/// The route to list and create records.
pub const RECORDS: &str = "/api/records";
/// The route to list the records that belong to an installment plan.
pub const RECORD_INSTALLMENTS: &str = "/api/records/installments";
/// The route to access a single record.
pub const RECORD: &str = "/api/records/{record_id}";
/// The route for the aggregated dashboard summary.
pub const DASHBOARD: &str = "/api/dashboard";
/// The route to list and create debts.
pub const DEBTS: &str = "/api/debts";
/// The route to access a single debt.
pub const DEBT: &str = "/api/debts/{debt_id}";
/// The route to list and create balance items.
pub const BALANCE: &str = "/api/balance";
/// The route to access a single balance item.
pub const BALANCE_ITEM: &str = "/api/balance/{balance_id}";
/// The route for the expense type catalog.
pub const CATALOG_EXPENSE_TYPES: &str = "/api/catalogs/expense-types";
/// The route for the category catalog.
pub const CATALOG_CATEGORIES: &str = "/api/catalogs/categories";
/// The route for the payment method catalog.
pub const CATALOG_PAYMENT_METHODS: &str = "/api/catalogs/payment-methods";
/// The route for the month catalog.
pub const CATALOG_MONTHS: &str = "/api/catalogs/months";
