//! Defines the core data model and database queries for debts.

use rusqlite::{
    Connection, Row, ToSql, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{Error, database_id::DebtId, debt::form::DebtChanges};

/// What kind of liability a debt is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DebtType {
    /// A credit card balance.
    #[serde(rename = "T")]
    Card,
    /// Any other liability.
    #[serde(rename = "O")]
    Other,
}

impl DebtType {
    /// All debt types, in catalog order.
    pub const ALL: [DebtType; 2] = [DebtType::Card, DebtType::Other];

    /// The single-letter wire code for the debt type.
    pub fn as_str(&self) -> &'static str {
        match self {
            DebtType::Card => "T",
            DebtType::Other => "O",
        }
    }

    /// Parse a wire code, e.g. "T".
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|debt_type| debt_type.as_str() == code)
    }
}

impl FromSql for DebtType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        DebtType::from_code(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for DebtType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// A standing liability, independent of the periodic records.
///
/// Only the grand total of all debts feeds the dashboard; debts are never
/// scoped by the dashboard's month/year window because a debt total is a
/// point-in-time figure, not a period figure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Debt {
    /// The ID of the debt.
    pub id: DebtId,
    /// What kind of liability this is.
    pub debt_type: DebtType,
    /// A text label for the liability, e.g. the card name.
    pub item: String,
    /// The outstanding amount.
    pub amount: f64,
    /// The date the amount was observed.
    pub date: Date,
    /// When the debt was created, server-assigned.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the debt was last updated, server-assigned.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A fully validated payload for inserting a new debt.
#[derive(Debug, Clone, PartialEq)]
pub struct DebtDraft {
    /// What kind of liability this is.
    pub debt_type: DebtType,
    /// A text label for the liability.
    pub item: String,
    /// The outstanding amount.
    pub amount: f64,
    /// The date the amount was observed.
    pub date: Date,
}

pub(crate) fn create_debt_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS debt (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                debt_type TEXT NOT NULL,
                item TEXT NOT NULL,
                amount REAL NOT NULL,
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

pub(crate) fn map_debt_row(row: &Row) -> Result<Debt, rusqlite::Error> {
    Ok(Debt {
        id: row.get(0)?,
        debt_type: row.get(1)?,
        item: row.get(2)?,
        amount: row.get(3)?,
        date: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const DEBT_COLUMNS: &str = "id, debt_type, item, amount, date, created_at, updated_at";

/// List every debt, newest date first.
///
/// # Errors
/// Returns [Error::SqlError] if there is a SQL error.
pub(crate) fn list_debts(connection: &Connection) -> Result<Vec<Debt>, Error> {
    connection
        .prepare(&format!(
            "SELECT {DEBT_COLUMNS} FROM debt ORDER BY date DESC, id ASC"
        ))?
        .query_map([], map_debt_row)?
        .map(|debt_result| debt_result.map_err(Error::SqlError))
        .collect()
}

/// Insert a new debt into the database.
///
/// # Errors
/// Returns [Error::SqlError] if there is an unexpected SQL error.
pub(crate) fn insert_debt(draft: DebtDraft, connection: &Connection) -> Result<Debt, Error> {
    let now = OffsetDateTime::now_utc();

    let debt = connection
        .prepare(&format!(
            "INSERT INTO debt (debt_type, item, amount, date, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {DEBT_COLUMNS}"
        ))?
        .query_row(
            params![draft.debt_type, draft.item, draft.amount, draft.date, now, now],
            map_debt_row,
        )?;

    Ok(debt)
}

/// Apply a partial update to the debt `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingDebt] if `id` does not refer to a valid debt,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn update_debt(
    id: DebtId,
    changes: DebtChanges,
    connection: &Connection,
) -> Result<Debt, Error> {
    let existing = connection
        .prepare(&format!("SELECT {DEBT_COLUMNS} FROM debt WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_debt_row)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::UpdateMissingDebt,
            error => error,
        })?;

    let updated = changes.apply(existing, OffsetDateTime::now_utc());

    connection.execute(
        "UPDATE debt SET debt_type = ?1, item = ?2, amount = ?3, date = ?4, updated_at = ?5 \
         WHERE id = ?6",
        params![
            updated.debt_type,
            updated.item,
            updated.amount,
            updated.date,
            updated.updated_at,
            id,
        ],
    )?;

    connection
        .prepare(&format!("SELECT {DEBT_COLUMNS} FROM debt WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_debt_row)
        .map_err(|error| error.into())
}

/// Delete the debt `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingDebt] if `id` does not refer to a valid debt,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn delete_debt(id: DebtId, connection: &Connection) -> Result<(), Error> {
    let rows_deleted = connection.execute("DELETE FROM debt WHERE id = ?1", [id])?;

    if rows_deleted == 0 {
        return Err(Error::DeleteMissingDebt);
    }

    Ok(())
}

/// Get the total amount owed across all debts.
///
/// # Errors
/// Returns [Error::SqlError] if there is a SQL error.
pub(crate) fn get_total_debt(connection: &Connection) -> Result<f64, Error> {
    let mut stmt = connection.prepare("SELECT COALESCE(SUM(amount), 0) FROM debt")?;

    let total: f64 = stmt.query_row([], |row| row.get(0))?;

    Ok(total)
}
