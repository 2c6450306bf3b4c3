//! Database query helpers for listing records.

use rusqlite::{Connection, params_from_iter};

use crate::{
    Error,
    pagination::{PageRequest, total_pages},
    record::{
        db::{RECORD_COLUMNS, map_record_row},
        filter::RecordFilter,
        models::{ExpenseType, Record},
    },
};

/// One page of records matching a filter, plus pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPage {
    /// The records of the requested page, ordered by charge date descending.
    pub records: Vec<Record>,
    /// The 1-based page number that was served.
    pub page: u64,
    /// The page size that was applied.
    pub limit: u64,
    /// The number of matching records, ignoring pagination.
    pub total: u64,
    /// The number of pages needed to serve all matching records.
    pub pages: u64,
}

/// Query one page of the records matching `filter`.
///
/// Records are sorted by charge date descending, then ID ascending to keep
/// the order stable across pages. A page past the end of the result set
/// yields an empty slice, not an error.
///
/// # Errors
/// Returns [Error::SqlError] if there is a SQL error.
pub(crate) fn list_records(
    filter: &RecordFilter,
    page_request: PageRequest,
    connection: &Connection,
) -> Result<RecordPage, Error> {
    let (where_clause, parameters) = filter.to_where_clause();

    let total: u64 = connection
        .prepare(&format!("SELECT COUNT(id) FROM record{where_clause}"))?
        .query_row(params_from_iter(parameters.iter()), |row| {
            row.get::<_, i64>(0)
        })? as u64;

    let query = format!(
        "SELECT {RECORD_COLUMNS} FROM record{where_clause} \
         ORDER BY charge_date DESC, id ASC LIMIT {} OFFSET {}",
        page_request.limit,
        page_request.offset(),
    );

    let records = connection
        .prepare(&query)?
        .query_map(params_from_iter(parameters.iter()), map_record_row)?
        .map(|record_result| record_result.map_err(Error::SqlError))
        .collect::<Result<Vec<Record>, Error>>()?;

    Ok(RecordPage {
        records,
        page: page_request.page,
        limit: page_request.limit,
        total,
        pages: total_pages(total, page_request.limit),
    })
}

/// Query the records that belong to a multi-month installment plan
/// (expense types MSI and MCI), newest charge first.
///
/// # Errors
/// Returns [Error::SqlError] if there is a SQL error.
pub(crate) fn list_installment_records(connection: &Connection) -> Result<Vec<Record>, Error> {
    let filter = RecordFilter {
        expense_types: ExpenseType::INSTALLMENT_TYPES.to_vec(),
        ..RecordFilter::default()
    };
    let (where_clause, parameters) = filter.to_where_clause();

    connection
        .prepare(&format!(
            "SELECT {RECORD_COLUMNS} FROM record{where_clause} ORDER BY charge_date DESC, id ASC"
        ))?
        .query_map(params_from_iter(parameters.iter()), map_record_row)?
        .map(|record_result| record_result.map_err(Error::SqlError))
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        pagination::PageRequest,
        record::{
            db::{create_record_table, insert_record},
            filter::RecordFilter,
            models::{Category, ExpenseType, Month},
            test_utils::record_draft,
        },
    };

    use super::{list_installment_records, list_records};

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_record_table(&conn).unwrap();
        conn
    }

    fn default_page() -> PageRequest {
        PageRequest { page: 1, limit: 20 }
    }

    #[test]
    fn records_match_only_when_every_field_matches() {
        let conn = get_test_connection();
        insert_record(
            record_draft("Súper", 100.0, Category::Expense, Month::August, 2025),
            &conn,
        )
        .unwrap();
        insert_record(
            record_draft("Gasolina", 50.0, Category::Expense, Month::July, 2025),
            &conn,
        )
        .unwrap();
        insert_record(
            record_draft("Nómina", 200.0, Category::Income, Month::August, 2025),
            &conn,
        )
        .unwrap();

        // AND across fields, OR within the multi-valued month field.
        let filter = RecordFilter {
            categories: vec![Category::Expense],
            months: vec![Month::August, Month::September],
            ..RecordFilter::default()
        };
        let page = list_records(&filter, default_page(), &conn).unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.records[0].concept, "Súper");
    }

    #[test]
    fn paging_reconstructs_the_full_filtered_set() {
        let conn = get_test_connection();
        for i in 0..7 {
            insert_record(
                record_draft(
                    &format!("record #{i}"),
                    (i + 1) as f64,
                    Category::Expense,
                    Month::August,
                    2025,
                ),
                &conn,
            )
            .unwrap();
        }

        let filter = RecordFilter::default();
        let mut seen = HashSet::new();
        let mut pages_fetched = 0;

        loop {
            pages_fetched += 1;
            let page = list_records(
                &filter,
                PageRequest {
                    page: pages_fetched,
                    limit: 3,
                },
                &conn,
            )
            .unwrap();

            assert_eq!(page.total, 7);
            assert_eq!(page.pages, 3);

            for record in &page.records {
                // No duplicates across pages.
                assert!(seen.insert(record.id), "record {} served twice", record.id);
            }

            if pages_fetched == page.pages {
                break;
            }
        }

        // No omissions.
        assert_eq!(seen.len(), 7);
    }

    #[test]
    fn page_past_the_end_is_empty_not_an_error() {
        let conn = get_test_connection();
        insert_record(
            record_draft("Súper", 100.0, Category::Expense, Month::August, 2025),
            &conn,
        )
        .unwrap();

        let page = list_records(
            &RecordFilter::default(),
            PageRequest { page: 5, limit: 20 },
            &conn,
        )
        .unwrap();

        assert!(page.records.is_empty());
        assert_eq!(page.total, 1);
        assert_eq!(page.pages, 1);
    }

    #[test]
    fn empty_store_reports_zero_pages() {
        let conn = get_test_connection();

        let page = list_records(&RecordFilter::default(), default_page(), &conn).unwrap();

        assert!(page.records.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.pages, 0);
    }

    #[test]
    fn records_are_ordered_by_charge_date_descending() {
        let conn = get_test_connection();

        let mut early = record_draft("early", 1.0, Category::Expense, Month::August, 2025);
        early.charge_date = date!(2025 - 08 - 01);
        let mut late = record_draft("late", 2.0, Category::Expense, Month::August, 2025);
        late.charge_date = date!(2025 - 08 - 20);

        insert_record(early, &conn).unwrap();
        insert_record(late, &conn).unwrap();

        let page = list_records(&RecordFilter::default(), default_page(), &conn).unwrap();

        let concepts: Vec<&str> = page
            .records
            .iter()
            .map(|record| record.concept.as_str())
            .collect();
        assert_eq!(concepts, vec!["late", "early"]);
    }

    #[test]
    fn date_range_bounds_are_inclusive() {
        let conn = get_test_connection();

        for (concept, day) in [("first", 1), ("second", 15), ("third", 31)] {
            let mut draft = record_draft(concept, 1.0, Category::Expense, Month::August, 2025);
            draft.charge_date = date!(2025 - 08 - 01).replace_day(day).unwrap();
            insert_record(draft, &conn).unwrap();
        }

        let filter = RecordFilter {
            charge_date_from: Some(date!(2025 - 08 - 01)),
            charge_date_to: Some(date!(2025 - 08 - 15)),
            ..RecordFilter::default()
        };
        let page = list_records(&filter, default_page(), &conn).unwrap();

        assert_eq!(page.total, 2);
    }

    #[test]
    fn installment_records_are_limited_to_installment_types() {
        let conn = get_test_connection();

        let mut installment = record_draft("Vianney má", 867.0, Category::Expense, Month::August, 2025);
        installment.expense_type = ExpenseType::Msi;
        installment.is_installment = true;
        installment.installment_index = 1;
        installment.installment_total = 3;
        insert_record(installment, &conn).unwrap();

        insert_record(
            record_draft("Súper", 100.0, Category::Expense, Month::August, 2025),
            &conn,
        )
        .unwrap();

        let records = list_installment_records(&conn).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].concept, "Vianney má");
        assert_eq!(records[0].installment_total, 3);
    }
}
