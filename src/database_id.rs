//! Type aliases for database row identifiers.

/// Alias for integer database IDs.
pub type DatabaseId = i64;

/// The ID of an expense/income record.
pub type RecordId = DatabaseId;

/// The ID of a debt.
pub type DebtId = DatabaseId;

/// The ID of a balance item.
pub type BalanceItemId = DatabaseId;
