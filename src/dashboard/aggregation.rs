//! Aggregation queries for the dashboard.
//!
//! Every function takes the same optional (year, month) scope and computes
//! one summary figure over the matching records. Partitions with no rows are
//! omitted from group-by results rather than emitted as zero entries.

use std::collections::BTreeMap;

use rusqlite::{Connection, params_from_iter, types::Value};
use serde::Serialize;

use crate::{
    Error,
    record::{Category, ExpenseType, Month},
};

/// The optional (year, month) window a dashboard request is scoped to.
///
/// The scope matches the denormalized `month`/`year` fields of a record, not
/// its calendar dates, since records are attributed to billing periods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardScope {
    /// Limit aggregation to records attributed to this year.
    pub year: Option<i32>,
    /// Limit aggregation to records attributed to this month.
    pub month: Option<Month>,
}

impl DashboardScope {
    /// Compile the scope (plus an optional category constraint) into a SQL
    /// `WHERE` clause and its parameters. Empty when unconstrained.
    fn to_where_clause(&self, category: Option<Category>) -> (String, Vec<Value>) {
        let mut clause_parts = Vec::new();
        let mut parameters: Vec<Value> = Vec::new();

        if let Some(year) = self.year {
            clause_parts.push(format!("year = ?{}", parameters.len() + 1));
            parameters.push(Value::from(i64::from(year)));
        }

        if let Some(month) = self.month {
            clause_parts.push(format!("month = ?{}", parameters.len() + 1));
            parameters.push(Value::from(month.name().to_owned()));
        }

        if let Some(category) = category {
            clause_parts.push(format!("category = ?{}", parameters.len() + 1));
            parameters.push(Value::from(category.as_str().to_owned()));
        }

        if clause_parts.is_empty() {
            (String::new(), parameters)
        } else {
            (format!(" WHERE {}", clause_parts.join(" AND ")), parameters)
        }
    }
}

/// One entry of the expense-by-month trend series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTotal {
    /// The billing month of the partition.
    pub month: Month,
    /// The billing year of the partition.
    pub year: i32,
    /// The summed amount of the partition.
    pub total: f64,
}

/// Sum the amounts of the records in scope with the given category.
///
/// Returns 0 (not an error) when no records match.
///
/// # Errors
/// Returns [Error::SqlError] if there is a SQL error.
pub(crate) fn total_by_category(
    scope: &DashboardScope,
    category: Category,
    connection: &Connection,
) -> Result<f64, Error> {
    let (where_clause, parameters) = scope.to_where_clause(Some(category));

    let total: f64 = connection
        .prepare(&format!(
            "SELECT COALESCE(SUM(amount), 0) FROM record{where_clause}"
        ))?
        .query_row(params_from_iter(parameters.iter()), |row| row.get(0))?;

    Ok(total)
}

/// Sum the expense records in scope, partitioned by expense type.
///
/// # Errors
/// Returns [Error::SqlError] if there is a SQL error.
pub(crate) fn expenses_by_type(
    scope: &DashboardScope,
    connection: &Connection,
) -> Result<BTreeMap<ExpenseType, f64>, Error> {
    let (where_clause, parameters) = scope.to_where_clause(Some(Category::Expense));

    connection
        .prepare(&format!(
            "SELECT expense_type, SUM(amount) FROM record{where_clause} GROUP BY expense_type"
        ))?
        .query_map(params_from_iter(parameters.iter()), |row| {
            Ok((row.get::<_, ExpenseType>(0)?, row.get::<_, f64>(1)?))
        })?
        .map(|row_result| row_result.map_err(Error::SqlError))
        .collect()
}

/// Sum the records in scope, partitioned by category.
///
/// # Errors
/// Returns [Error::SqlError] if there is a SQL error.
pub(crate) fn totals_by_category(
    scope: &DashboardScope,
    connection: &Connection,
) -> Result<BTreeMap<Category, f64>, Error> {
    let (where_clause, parameters) = scope.to_where_clause(None);

    connection
        .prepare(&format!(
            "SELECT category, SUM(amount) FROM record{where_clause} GROUP BY category"
        ))?
        .query_map(params_from_iter(parameters.iter()), |row| {
            Ok((row.get::<_, Category>(0)?, row.get::<_, f64>(1)?))
        })?
        .map(|row_result| row_result.map_err(Error::SqlError))
        .collect()
}

/// Sum the expense records in scope, partitioned by (month, year) and sorted
/// ascending for trend display.
///
/// The sort maps month names to their calendar ordinal: the lexical order of
/// Spanish month names is not calendar order.
///
/// # Errors
/// Returns [Error::SqlError] if there is a SQL error.
pub(crate) fn expenses_by_month(
    scope: &DashboardScope,
    connection: &Connection,
) -> Result<Vec<MonthlyTotal>, Error> {
    let (where_clause, parameters) = scope.to_where_clause(Some(Category::Expense));

    let mut totals = connection
        .prepare(&format!(
            "SELECT month, year, SUM(amount) FROM record{where_clause} GROUP BY year, month"
        ))?
        .query_map(params_from_iter(parameters.iter()), |row| {
            Ok(MonthlyTotal {
                month: row.get(0)?,
                year: row.get(1)?,
                total: row.get(2)?,
            })
        })?
        .map(|row_result| row_result.map_err(Error::SqlError))
        .collect::<Result<Vec<MonthlyTotal>, Error>>()?;

    totals.sort_by_key(|entry| (entry.year, entry.month.ordinal()));

    Ok(totals)
}

#[cfg(test)]
mod tests {
    use rusqlite::Connection;

    use crate::record::{
        db::{create_record_table, insert_record},
        models::{Category, ExpenseType, Month},
        test_utils::record_draft,
    };

    use super::{
        DashboardScope, expenses_by_month, expenses_by_type, total_by_category, totals_by_category,
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_record_table(&conn).unwrap();
        conn
    }

    fn seed_august_scenario(conn: &Connection) {
        insert_record(
            record_draft("Depósito", 281.0, Category::Expense, Month::August, 2025),
            conn,
        )
        .unwrap();
        insert_record(
            record_draft("Puntos", -10.0, Category::Income, Month::August, 2025),
            conn,
        )
        .unwrap();

        let mut installment =
            record_draft("Vianney má", 867.0, Category::Expense, Month::August, 2025);
        installment.expense_type = ExpenseType::Msi;
        installment.is_installment = true;
        installment.installment_index = 1;
        installment.installment_total = 3;
        insert_record(installment, conn).unwrap();
    }

    fn august_2025() -> DashboardScope {
        DashboardScope {
            year: Some(2025),
            month: Some(Month::August),
        }
    }

    #[test]
    fn totals_match_the_seeded_scenario() {
        let conn = get_test_connection();
        seed_august_scenario(&conn);

        let scope = august_2025();

        let total_expenses = total_by_category(&scope, Category::Expense, &conn).unwrap();
        let total_income = total_by_category(&scope, Category::Income, &conn).unwrap();

        assert_eq!(total_expenses, 1148.0);
        assert_eq!(total_income, -10.0);
        assert_eq!(total_income - total_expenses, -1158.0);
    }

    #[test]
    fn balance_identity_holds_for_every_scope() {
        let conn = get_test_connection();
        seed_august_scenario(&conn);
        insert_record(
            record_draft("Nómina", 1000.0, Category::Income, Month::July, 2025),
            &conn,
        )
        .unwrap();

        for scope in [
            DashboardScope::default(),
            august_2025(),
            DashboardScope {
                year: Some(2024),
                month: None,
            },
        ] {
            let income = total_by_category(&scope, Category::Income, &conn).unwrap();
            let expenses = total_by_category(&scope, Category::Expense, &conn).unwrap();
            let by_category = totals_by_category(&scope, &conn).unwrap();

            let income_partition = by_category.get(&Category::Income).copied().unwrap_or(0.0);
            let expense_partition = by_category.get(&Category::Expense).copied().unwrap_or(0.0);

            assert_eq!(income, income_partition);
            assert_eq!(expenses, expense_partition);
        }
    }

    #[test]
    fn empty_scope_sums_to_zero() {
        let conn = get_test_connection();

        let scope = august_2025();

        assert_eq!(
            total_by_category(&scope, Category::Expense, &conn).unwrap(),
            0.0
        );
        assert_eq!(
            total_by_category(&scope, Category::Income, &conn).unwrap(),
            0.0
        );
    }

    #[test]
    fn group_by_type_omits_absent_partitions() {
        let conn = get_test_connection();
        seed_august_scenario(&conn);

        let by_type = expenses_by_type(&august_2025(), &conn).unwrap();

        // Fijo and MSI are present; Variable and MCI have no rows and must be
        // absent, not zero.
        assert_eq!(by_type.len(), 2);
        assert_eq!(by_type[&ExpenseType::Fixed], 281.0);
        assert_eq!(by_type[&ExpenseType::Msi], 867.0);
        assert!(!by_type.contains_key(&ExpenseType::Variable));
    }

    #[test]
    fn group_by_type_only_counts_expenses() {
        let conn = get_test_connection();
        insert_record(
            record_draft("Nómina", 1000.0, Category::Income, Month::August, 2025),
            &conn,
        )
        .unwrap();

        let by_type = expenses_by_type(&DashboardScope::default(), &conn).unwrap();

        assert!(by_type.is_empty());
    }

    #[test]
    fn monthly_trend_is_in_calendar_order_not_lexical() {
        let conn = get_test_connection();

        // Lexically: Agosto < Diciembre < Febrero. By calendar: Febrero,
        // Agosto, Diciembre.
        for month in [Month::December, Month::February, Month::August] {
            insert_record(
                record_draft("gasto", 100.0, Category::Expense, month, 2025),
                &conn,
            )
            .unwrap();
        }
        // An earlier year sorts first regardless of month.
        insert_record(
            record_draft("gasto", 100.0, Category::Expense, Month::November, 2024),
            &conn,
        )
        .unwrap();

        let trend = expenses_by_month(&DashboardScope::default(), &conn).unwrap();

        let order: Vec<(i32, Month)> = trend.iter().map(|entry| (entry.year, entry.month)).collect();
        assert_eq!(
            order,
            vec![
                (2024, Month::November),
                (2025, Month::February),
                (2025, Month::August),
                (2025, Month::December),
            ]
        );
    }
}
