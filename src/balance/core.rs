//! Defines the core data model and database queries for balance items.

use rusqlite::{
    Connection, Row, ToSql, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, balance::form::BalanceItemChanges, database_id::BalanceItemId};

/// Which side of a reconciliation a balance item sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BalanceType {
    /// A debit entry.
    #[serde(rename = "D")]
    Debit,
    /// A credit entry.
    #[serde(rename = "C")]
    Credit,
}

impl BalanceType {
    /// All balance types, in catalog order.
    pub const ALL: [BalanceType; 2] = [BalanceType::Debit, BalanceType::Credit];

    /// The single-letter wire code for the balance type.
    pub fn as_str(&self) -> &'static str {
        match self {
            BalanceType::Debit => "D",
            BalanceType::Credit => "C",
        }
    }

    /// Parse a wire code, e.g. "D".
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|balance_type| balance_type.as_str() == code)
    }
}

impl FromSql for BalanceType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        BalanceType::from_code(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for BalanceType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// A reconciliation entry comparing an actual amount against what it should
/// be for an account.
///
/// Balance items have their own lifecycle and are not aggregated into the
/// dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceItem {
    /// The ID of the balance item.
    pub id: BalanceItemId,
    /// Which side of the reconciliation the entry sits on.
    pub balance_type: BalanceType,
    /// A text label for the account or entry.
    pub concept: String,
    /// The actual amount observed.
    pub amount: f64,
    /// The amount the entry should be.
    pub expected_amount: f64,
    /// The gap between actual and expected, when recorded.
    pub difference: Option<f64>,
    /// Free-text notes about the entry.
    pub comments: Option<String>,
    /// When the item was created, server-assigned.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the item was last updated, server-assigned.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A fully validated payload for inserting a new balance item.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceItemDraft {
    /// Which side of the reconciliation the entry sits on.
    pub balance_type: BalanceType,
    /// A text label for the account or entry.
    pub concept: String,
    /// The actual amount observed.
    pub amount: f64,
    /// The amount the entry should be.
    pub expected_amount: f64,
    /// The gap between actual and expected, when recorded.
    pub difference: Option<f64>,
    /// Free-text notes about the entry.
    pub comments: Option<String>,
}

pub(crate) fn create_balance_item_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS balance_item (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                balance_type TEXT NOT NULL,
                concept TEXT NOT NULL,
                amount REAL NOT NULL,
                expected_amount REAL NOT NULL DEFAULT 0,
                difference REAL,
                comments TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

pub(crate) fn map_balance_item_row(row: &Row) -> Result<BalanceItem, rusqlite::Error> {
    Ok(BalanceItem {
        id: row.get(0)?,
        balance_type: row.get(1)?,
        concept: row.get(2)?,
        amount: row.get(3)?,
        expected_amount: row.get(4)?,
        difference: row.get(5)?,
        comments: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const BALANCE_ITEM_COLUMNS: &str =
    "id, balance_type, concept, amount, expected_amount, difference, comments, created_at, \
     updated_at";

/// List every balance item, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if there is a SQL error.
pub(crate) fn list_balance_items(connection: &Connection) -> Result<Vec<BalanceItem>, Error> {
    connection
        .prepare(&format!(
            "SELECT {BALANCE_ITEM_COLUMNS} FROM balance_item ORDER BY created_at DESC, id DESC"
        ))?
        .query_map([], map_balance_item_row)?
        .map(|item_result| item_result.map_err(Error::SqlError))
        .collect()
}

/// Insert a new balance item into the database.
///
/// # Errors
/// Returns [Error::SqlError] if there is an unexpected SQL error.
pub(crate) fn insert_balance_item(
    draft: BalanceItemDraft,
    connection: &Connection,
) -> Result<BalanceItem, Error> {
    let now = OffsetDateTime::now_utc();

    let item = connection
        .prepare(&format!(
            "INSERT INTO balance_item (balance_type, concept, amount, expected_amount, \
             difference, comments, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {BALANCE_ITEM_COLUMNS}"
        ))?
        .query_row(
            params![
                draft.balance_type,
                draft.concept,
                draft.amount,
                draft.expected_amount,
                draft.difference,
                draft.comments,
                now,
                now,
            ],
            map_balance_item_row,
        )?;

    Ok(item)
}

/// Apply a partial update to the balance item `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingBalanceItem] if `id` does not refer to a valid
///   balance item,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn update_balance_item(
    id: BalanceItemId,
    changes: BalanceItemChanges,
    connection: &Connection,
) -> Result<BalanceItem, Error> {
    let existing = connection
        .prepare(&format!(
            "SELECT {BALANCE_ITEM_COLUMNS} FROM balance_item WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_balance_item_row)
        .map_err(|error| match Error::from(error) {
            Error::NotFound => Error::UpdateMissingBalanceItem,
            error => error,
        })?;

    let updated = changes.apply(existing, OffsetDateTime::now_utc());

    connection.execute(
        "UPDATE balance_item SET balance_type = ?1, concept = ?2, amount = ?3, \
         expected_amount = ?4, difference = ?5, comments = ?6, updated_at = ?7 WHERE id = ?8",
        params![
            updated.balance_type,
            updated.concept,
            updated.amount,
            updated.expected_amount,
            updated.difference,
            updated.comments,
            updated.updated_at,
            id,
        ],
    )?;

    connection
        .prepare(&format!(
            "SELECT {BALANCE_ITEM_COLUMNS} FROM balance_item WHERE id = :id"
        ))?
        .query_row(&[(":id", &id)], map_balance_item_row)
        .map_err(|error| error.into())
}

/// Delete the balance item `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingBalanceItem] if `id` does not refer to a valid
///   balance item,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn delete_balance_item(id: BalanceItemId, connection: &Connection) -> Result<(), Error> {
    let rows_deleted = connection.execute("DELETE FROM balance_item WHERE id = ?1", [id])?;

    if rows_deleted == 0 {
        return Err(Error::DeleteMissingBalanceItem);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{Error, balance::form::BalanceItemChanges};

    use super::{
        BalanceItemDraft, BalanceType, create_balance_item_table, delete_balance_item,
        insert_balance_item, list_balance_items, update_balance_item,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_balance_item_table(&conn).unwrap();
        conn
    }

    fn debit_item(concept: &str, amount: f64, expected_amount: f64) -> BalanceItemDraft {
        BalanceItemDraft {
            balance_type: BalanceType::Debit,
            concept: concept.to_owned(),
            amount,
            expected_amount,
            difference: None,
            comments: None,
        }
    }

    #[test]
    fn insert_then_list_round_trips() {
        let conn = get_test_connection();

        let inserted =
            insert_balance_item(debit_item("Nu débito", 1500.0, 1450.0), &conn).unwrap();

        let items = list_balance_items(&conn).unwrap();

        assert_eq!(items, vec![inserted]);
        assert_eq!(items[0].expected_amount, 1450.0);
        assert_eq!(items[0].difference, None);
    }

    #[test]
    fn update_changes_only_the_given_fields() {
        let conn = get_test_connection();
        let inserted =
            insert_balance_item(debit_item("Nu débito", 1500.0, 1450.0), &conn).unwrap();

        let changes = BalanceItemChanges {
            difference: Some(Some(50.0)),
            comments: Some(Some("pending refund".to_owned())),
            ..BalanceItemChanges::default()
        };
        let updated = update_balance_item(inserted.id, changes, &conn).unwrap();

        assert_eq!(updated.difference, Some(50.0));
        assert_eq!(updated.comments.as_deref(), Some("pending refund"));
        assert_eq!(updated.concept, "Nu débito");
    }

    #[test]
    fn update_fails_for_unknown_id() {
        let conn = get_test_connection();

        let got = update_balance_item(42, BalanceItemChanges::default(), &conn);

        assert_eq!(got, Err(Error::UpdateMissingBalanceItem));
    }

    #[test]
    fn delete_is_never_silent_for_unknown_id() {
        let conn = get_test_connection();

        assert_eq!(
            delete_balance_item(42, &conn),
            Err(Error::DeleteMissingBalanceItem)
        );
    }
}
