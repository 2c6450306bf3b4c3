//! The dashboard assembler endpoint.
//!
//! Six independent aggregation queries are fanned out as blocking tasks and
//! joined with fail-fast semantics: if any query fails, the whole request
//! fails. The queries have no ordering dependency, so the shared connection
//! is free to serialize them without changing the result.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    dashboard::aggregation::{
        DashboardScope, MonthlyTotal, expenses_by_month, expenses_by_type, total_by_category,
        totals_by_category,
    },
    debt::get_total_debt,
    record::{Category, ExpenseType, Month},
    response::{ApiResponse, FieldError},
};

/// The raw, unvalidated query string of the dashboard endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct RawDashboardQuery {
    /// The billing year to scope to.
    pub year: Option<String>,
    /// The Spanish billing month name to scope to.
    pub month: Option<String>,
}

impl RawDashboardQuery {
    /// Validate the query string into a dashboard scope.
    ///
    /// # Errors
    /// Returns [Error::InvalidFilters] with one entry per offending
    /// parameter.
    fn validate(self) -> Result<DashboardScope, Error> {
        let mut errors = Vec::new();

        let year = self.year.and_then(|value| match value.parse::<i32>() {
            Ok(year) => Some(year),
            Err(_) => {
                errors.push(FieldError::new("year", "Year must be an integer"));
                None
            }
        });

        let month = self.month.and_then(|value| match Month::from_name(&value) {
            Some(month) => Some(month),
            None => {
                errors.push(FieldError::new(
                    "month",
                    "Month must be a Spanish month name, e.g. Agosto",
                ));
                None
            }
        });

        if !errors.is_empty() {
            return Err(Error::InvalidFilters(errors));
        }

        Ok(DashboardScope { year, month })
    }
}

/// The aggregated summary served by the dashboard endpoint.
///
/// Each aggregate has an explicit shape: maps for the by-type and
/// by-category partitions (absent partitions are omitted), an ordered list
/// for the monthly trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// The summed amount of expense records in scope.
    pub total_expenses: f64,
    /// The summed amount of income records in scope.
    pub total_income: f64,
    /// `total_income - total_expenses`; positive means net income.
    pub monthly_balance: f64,
    /// Expense totals partitioned by expense type.
    pub by_type: BTreeMap<ExpenseType, f64>,
    /// Totals partitioned by category.
    pub by_category: BTreeMap<Category, f64>,
    /// The expense trend by billing month, ascending by (year, month).
    pub by_month: Vec<MonthlyTotal>,
    /// The grand total of all debts, never scoped by year/month: a debt
    /// total is a point-in-time figure, not a period figure.
    pub total_debt: f64,
}

/// Run one aggregation query on a blocking task.
async fn spawn_query<T, F>(connection: Arc<Mutex<Connection>>, query: F) -> Result<T, Error>
where
    T: Send + 'static,
    F: FnOnce(&Connection) -> Result<T, Error> + Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let connection = connection.lock().map_err(|_| Error::DatabaseLockError)?;
        query(&connection)
    })
    .await
    .map_err(|_| Error::TaskJoin)?
}

/// Assemble the dashboard summary for `scope`.
///
/// # Errors
/// Fails with the first error of any component query; no partial summary is
/// produced.
pub(crate) async fn assemble_dashboard(
    scope: DashboardScope,
    connection: Arc<Mutex<Connection>>,
) -> Result<DashboardSummary, Error> {
    let expense_scope = scope.clone();
    let income_scope = scope.clone();
    let type_scope = scope.clone();
    let category_scope = scope.clone();
    let month_scope = scope;

    let (total_expenses, total_income, by_type, by_category, by_month, total_debt) = tokio::try_join!(
        spawn_query(connection.clone(), move |conn| total_by_category(
            &expense_scope,
            Category::Expense,
            conn
        )),
        spawn_query(connection.clone(), move |conn| total_by_category(
            &income_scope,
            Category::Income,
            conn
        )),
        spawn_query(connection.clone(), move |conn| expenses_by_type(
            &type_scope,
            conn
        )),
        spawn_query(connection.clone(), move |conn| totals_by_category(
            &category_scope,
            conn
        )),
        spawn_query(connection.clone(), move |conn| expenses_by_month(
            &month_scope,
            conn
        )),
        spawn_query(connection, get_total_debt),
    )?;

    Ok(DashboardSummary {
        total_expenses,
        total_income,
        monthly_balance: total_income - total_expenses,
        by_type,
        by_category,
        by_month,
        total_debt,
    })
}

/// A route handler for the dashboard summary.
///
/// Accepts optional `year` and `month` query parameters scoping every record
/// aggregate; the debt total is always global.
pub async fn dashboard_endpoint(
    State(state): State<AppState>,
    Query(raw_query): Query<RawDashboardQuery>,
) -> Response {
    let scope = match raw_query.validate() {
        Ok(scope) => scope,
        Err(error) => return error.into_response(),
    };

    match assemble_dashboard(scope, state.db_connection.clone()).await {
        Ok(summary) => ApiResponse::ok(summary).into_response(StatusCode::OK),
        Err(error) => error.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        dashboard::aggregation::DashboardScope,
        db::initialize,
        debt::core::{DebtDraft, DebtType, insert_debt},
        record::{
            db::insert_record,
            models::{Category, ExpenseType, Month},
            test_utils::record_draft,
        },
    };

    use super::{RawDashboardQuery, assemble_dashboard};

    fn get_test_connection() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    #[tokio::test]
    async fn assembles_the_seeded_scenario() {
        let connection = get_test_connection();
        {
            let conn = connection.lock().unwrap();
            insert_record(
                record_draft("Depósito", 281.0, Category::Expense, Month::August, 2025),
                &conn,
            )
            .unwrap();
            insert_record(
                record_draft("Puntos", -10.0, Category::Income, Month::August, 2025),
                &conn,
            )
            .unwrap();

            let mut installment =
                record_draft("Vianney má", 867.0, Category::Expense, Month::August, 2025);
            installment.expense_type = ExpenseType::Msi;
            installment.is_installment = true;
            installment.installment_index = 1;
            installment.installment_total = 3;
            insert_record(installment, &conn).unwrap();
        }

        let scope = DashboardScope {
            year: Some(2025),
            month: Some(Month::August),
        };
        let summary = assemble_dashboard(scope, connection).await.unwrap();

        assert_eq!(summary.total_expenses, 1148.0);
        assert_eq!(summary.total_income, -10.0);
        assert_eq!(summary.monthly_balance, -1158.0);
        assert_eq!(summary.by_month.len(), 1);
        assert_eq!(summary.by_month[0].month, Month::August);
        assert_eq!(summary.by_month[0].total, 1148.0);
        assert_eq!(summary.total_debt, 0.0);
    }

    #[tokio::test]
    async fn debt_total_ignores_the_dashboard_scope() {
        let connection = get_test_connection();
        {
            let conn = connection.lock().unwrap();
            insert_debt(
                DebtDraft {
                    debt_type: DebtType::Card,
                    item: "BBVA Oro".to_owned(),
                    amount: 5300.0,
                    date: date!(2023 - 01 - 01),
                },
                &conn,
            )
            .unwrap();
        }

        // Scope to a window with no records at all; the debt still counts.
        let scope = DashboardScope {
            year: Some(2025),
            month: Some(Month::August),
        };
        let summary = assemble_dashboard(scope, connection).await.unwrap();

        assert_eq!(summary.total_expenses, 0.0);
        assert_eq!(summary.monthly_balance, 0.0);
        assert_eq!(summary.total_debt, 5300.0);
    }

    #[tokio::test]
    async fn empty_store_yields_an_all_zero_summary() {
        let connection = get_test_connection();

        let summary = assemble_dashboard(DashboardScope::default(), connection)
            .await
            .unwrap();

        assert_eq!(summary.total_expenses, 0.0);
        assert_eq!(summary.total_income, 0.0);
        assert_eq!(summary.monthly_balance, 0.0);
        assert!(summary.by_type.is_empty());
        assert!(summary.by_category.is_empty());
        assert!(summary.by_month.is_empty());
    }

    #[test]
    fn scope_validation_collects_both_errors() {
        let raw = RawDashboardQuery {
            year: Some("last".to_owned()),
            month: Some("Augusto".to_owned()),
        };

        let Err(crate::Error::InvalidFilters(errors)) = raw.validate() else {
            panic!("expected a validation error");
        };

        let fields: Vec<&str> = errors.iter().map(|error| error.field.as_str()).collect();
        assert_eq!(fields, vec!["year", "month"]);
    }
}
