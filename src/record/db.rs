//! Database schema and row-level queries for records.

use rusqlite::{Connection, Row, params};
use time::OffsetDateTime;

use crate::{
    Error,
    database_id::RecordId,
    record::{
        form::RecordChanges,
        models::{Record, RecordDraft},
    },
};

/// The record columns in table order, for SELECT and RETURNING clauses.
pub(crate) const RECORD_COLUMNS: &str = "id, concept, amount, expense_type, payment_method, \
     month, year, charge_date, pay_date, category, is_installment, installment_index, \
     installment_total, tag, is_split, monthly_label, created_at, updated_at";

pub(crate) fn create_record_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS record (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                concept TEXT NOT NULL,
                amount REAL NOT NULL,
                expense_type TEXT NOT NULL,
                payment_method TEXT NOT NULL,
                month TEXT NOT NULL,
                year INTEGER NOT NULL,
                charge_date TEXT NOT NULL,
                pay_date TEXT NOT NULL,
                category TEXT NOT NULL,
                is_installment INTEGER NOT NULL DEFAULT 0,
                installment_index INTEGER NOT NULL DEFAULT 0,
                installment_total INTEGER NOT NULL DEFAULT 0,
                tag TEXT NOT NULL DEFAULT 'NA',
                is_split INTEGER NOT NULL DEFAULT 0,
                monthly_label TEXT NOT NULL DEFAULT 'NA',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

pub(crate) fn map_record_row(row: &Row) -> Result<Record, rusqlite::Error> {
    Ok(Record {
        id: row.get(0)?,
        concept: row.get(1)?,
        amount: row.get(2)?,
        expense_type: row.get(3)?,
        payment_method: row.get(4)?,
        month: row.get(5)?,
        year: row.get(6)?,
        charge_date: row.get(7)?,
        pay_date: row.get(8)?,
        category: row.get(9)?,
        is_installment: row.get(10)?,
        installment_index: row.get(11)?,
        installment_total: row.get(12)?,
        tag: row.get(13)?,
        is_split: row.get(14)?,
        monthly_label: row.get(15)?,
        created_at: row.get(16)?,
        updated_at: row.get(17)?,
    })
}

/// Insert a new record into the database.
///
/// `created_at` and `updated_at` are assigned by the server.
///
/// # Errors
/// Returns [Error::SqlError] if there is an unexpected SQL error.
pub(crate) fn insert_record(draft: RecordDraft, connection: &Connection) -> Result<Record, Error> {
    let now = OffsetDateTime::now_utc();

    let record = connection
        .prepare(&format!(
            "INSERT INTO record (concept, amount, expense_type, payment_method, month, year, \
             charge_date, pay_date, category, is_installment, installment_index, \
             installment_total, tag, is_split, monthly_label, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
             RETURNING {RECORD_COLUMNS}"
        ))?
        .query_row(
            params![
                draft.concept,
                draft.amount,
                draft.expense_type,
                draft.payment_method,
                draft.month,
                draft.year,
                draft.charge_date,
                draft.pay_date,
                draft.category,
                draft.is_installment,
                draft.installment_index,
                draft.installment_total,
                draft.tag,
                draft.is_split,
                draft.monthly_label,
                now,
                now,
            ],
            map_record_row,
        )?;

    Ok(record)
}

/// Retrieve a record from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a valid record,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn get_record(id: RecordId, connection: &Connection) -> Result<Record, Error> {
    let record = connection
        .prepare(&format!("SELECT {RECORD_COLUMNS} FROM record WHERE id = :id"))?
        .query_row(&[(":id", &id)], map_record_row)?;

    Ok(record)
}

/// Apply a partial update to the record `id`.
///
/// Fields absent from `changes` keep their stored value. `updated_at` is
/// refreshed to the current time.
///
/// # Errors
/// This function will return a:
/// - [Error::UpdateMissingRecord] if `id` does not refer to a valid record,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn update_record(
    id: RecordId,
    changes: RecordChanges,
    connection: &Connection,
) -> Result<Record, Error> {
    let existing = get_record(id, connection).map_err(|error| match error {
        Error::NotFound => Error::UpdateMissingRecord,
        error => error,
    })?;

    let updated = changes.apply(existing, OffsetDateTime::now_utc());

    connection.execute(
        "UPDATE record SET concept = ?1, amount = ?2, expense_type = ?3, payment_method = ?4, \
         month = ?5, year = ?6, charge_date = ?7, pay_date = ?8, category = ?9, \
         is_installment = ?10, installment_index = ?11, installment_total = ?12, tag = ?13, \
         is_split = ?14, monthly_label = ?15, updated_at = ?16 WHERE id = ?17",
        params![
            updated.concept,
            updated.amount,
            updated.expense_type,
            updated.payment_method,
            updated.month,
            updated.year,
            updated.charge_date,
            updated.pay_date,
            updated.category,
            updated.is_installment,
            updated.installment_index,
            updated.installment_total,
            updated.tag,
            updated.is_split,
            updated.monthly_label,
            updated.updated_at,
            id,
        ],
    )?;

    get_record(id, connection)
}

/// Delete the record `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DeleteMissingRecord] if `id` does not refer to a valid record,
/// - or [Error::SqlError] if there is some other SQL error.
pub(crate) fn delete_record(id: RecordId, connection: &Connection) -> Result<(), Error> {
    let rows_deleted = connection.execute("DELETE FROM record WHERE id = ?1", [id])?;

    if rows_deleted == 0 {
        return Err(Error::DeleteMissingRecord);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        record::{
            db::{delete_record, get_record, insert_record, update_record},
            form::RecordChanges,
            models::{Category, ExpenseType, Month},
            test_utils::record_draft,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        super::create_record_table(&conn).unwrap();
        conn
    }

    #[test]
    fn insert_then_get_round_trips_every_field() {
        let conn = get_test_connection();
        let draft = record_draft("Depósito", 281.0, Category::Expense, Month::August, 2025);

        let inserted = insert_record(draft.clone(), &conn).unwrap();
        let got = get_record(inserted.id, &conn).unwrap();

        assert_eq!(inserted, got);
        assert_eq!(got.concept, draft.concept);
        assert_eq!(got.amount, draft.amount);
        assert_eq!(got.expense_type, draft.expense_type);
        assert_eq!(got.month, draft.month);
        assert_eq!(got.year, draft.year);
        assert_eq!(got.category, draft.category);
        assert_eq!(got.tag, "NA");
    }

    #[test]
    fn get_fails_for_unknown_id() {
        let conn = get_test_connection();

        let got = get_record(1337, &conn);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn update_changes_only_the_given_fields() {
        let conn = get_test_connection();
        let inserted = insert_record(
            record_draft("Luz", 450.0, Category::Expense, Month::July, 2025),
            &conn,
        )
        .unwrap();

        let changes = RecordChanges {
            amount: Some(460.5),
            expense_type: Some(ExpenseType::Variable),
            ..Default::default()
        };
        let updated = update_record(inserted.id, changes, &conn).unwrap();

        assert_eq!(updated.amount, 460.5);
        assert_eq!(updated.expense_type, ExpenseType::Variable);
        assert_eq!(updated.concept, "Luz");
        assert_eq!(updated.month, Month::July);

        let got = get_record(inserted.id, &conn).unwrap();
        assert_eq!(got, updated);
    }

    #[test]
    fn update_fails_for_unknown_id() {
        let conn = get_test_connection();

        let got = update_record(42, RecordChanges::default(), &conn);

        assert_eq!(got, Err(Error::UpdateMissingRecord));
    }

    #[test]
    fn delete_then_get_reports_not_found() {
        let conn = get_test_connection();
        let inserted = insert_record(
            record_draft("Cine", 120.0, Category::Expense, Month::July, 2025),
            &conn,
        )
        .unwrap();

        delete_record(inserted.id, &conn).unwrap();

        assert_eq!(get_record(inserted.id, &conn), Err(Error::NotFound));
    }

    #[test]
    fn delete_is_never_silent_for_unknown_id() {
        let conn = get_test_connection();

        assert_eq!(delete_record(42, &conn), Err(Error::DeleteMissingRecord));

        // Deleting twice reports the same error.
        let inserted = insert_record(
            record_draft("Cine", 120.0, Category::Expense, Month::July, 2025),
            &conn,
        )
        .unwrap();
        delete_record(inserted.id, &conn).unwrap();
        assert_eq!(
            delete_record(inserted.id, &conn),
            Err(Error::DeleteMissingRecord)
        );
    }
}
