//! Translates record list query parameters into a SQL predicate.
//!
//! A record matches when every supplied field matches (logical AND across
//! fields). A multi-valued field matches when the record's value is any of
//! the supplied values (logical OR within the field). Absent fields impose
//! no constraint, and unknown query keys are ignored.

use rusqlite::types::Value;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    pagination::{PageRequest, PaginationConfig},
    record::models::{Category, ExpenseType, Month},
    response::FieldError,
};

/// The raw, unvalidated query string of the record list endpoint.
///
/// Multi-valued fields accept repeated keys, e.g. `month=Agosto&month=Julio`.
/// Everything is accepted as text so that validation can report the complete
/// list of offending parameters at once.
#[derive(Debug, Default, Deserialize)]
pub struct RawRecordQuery {
    /// Expense type names to match.
    #[serde(default)]
    pub expense_type: Vec<String>,
    /// Category codes to match.
    #[serde(default)]
    pub category: Vec<String>,
    /// Payment methods to match.
    #[serde(default)]
    pub payment_method: Vec<String>,
    /// Spanish month names to match.
    #[serde(default)]
    pub month: Vec<String>,
    /// Billing years to match.
    #[serde(default)]
    pub year: Vec<String>,
    /// Lower bound (inclusive) on the charge date.
    pub charge_date_from: Option<String>,
    /// Upper bound (inclusive) on the charge date.
    pub charge_date_to: Option<String>,
    /// "true" or "false": match only (non-)installment records.
    pub is_installment: Option<String>,
    /// "true" or "false": match only (non-)split records.
    pub is_split: Option<String>,
    /// Tags to match.
    #[serde(default)]
    pub tag: Vec<String>,
    /// The 1-based page to return.
    pub page: Option<String>,
    /// The page size, at most 100.
    pub limit: Option<String>,
}

/// A validated set of filter criteria over records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    /// Match records with any of these expense types.
    pub expense_types: Vec<ExpenseType>,
    /// Match records with any of these categories.
    pub categories: Vec<Category>,
    /// Match records with any of these payment methods.
    pub payment_methods: Vec<String>,
    /// Match records attributed to any of these months.
    pub months: Vec<Month>,
    /// Match records attributed to any of these years.
    pub years: Vec<i32>,
    /// Match records charged on or after this date.
    pub charge_date_from: Option<Date>,
    /// Match records charged on or before this date.
    pub charge_date_to: Option<Date>,
    /// Match only records with this installment flag.
    pub is_installment: Option<bool>,
    /// Match only records with this split flag.
    pub is_split: Option<bool>,
    /// Match records with any of these tags.
    pub tags: Vec<String>,
}

impl RawRecordQuery {
    /// Validate the query string into a filter and a pagination request.
    ///
    /// # Errors
    /// Returns [Error::InvalidFilters] with one entry per offending
    /// parameter; every violation is collected before failing.
    pub fn validate(self, config: &PaginationConfig) -> Result<(RecordFilter, PageRequest), Error> {
        let mut errors = Vec::new();

        let filter = RecordFilter {
            expense_types: parse_values(self.expense_type, "expense_type", &mut errors, |value| {
                ExpenseType::from_name(value)
                    .ok_or("Expense type must be one of: Fijo, Variable, MSI, MCI")
            }),
            categories: parse_values(self.category, "category", &mut errors, |value| {
                Category::from_code(value).ok_or("Category must be one of: E, I")
            }),
            payment_methods: self.payment_method,
            months: parse_values(self.month, "month", &mut errors, |value| {
                Month::from_name(value).ok_or("Month must be a Spanish month name, e.g. Agosto")
            }),
            years: parse_values(self.year, "year", &mut errors, |value| {
                value.parse::<i32>().map_err(|_| "Year must be an integer")
            }),
            charge_date_from: self
                .charge_date_from
                .and_then(|value| parse_date("charge_date_from", &value, &mut errors)),
            charge_date_to: self
                .charge_date_to
                .and_then(|value| parse_date("charge_date_to", &value, &mut errors)),
            is_installment: self
                .is_installment
                .and_then(|value| parse_flag("is_installment", &value, &mut errors)),
            is_split: self
                .is_split
                .and_then(|value| parse_flag("is_split", &value, &mut errors)),
            tags: self.tag,
        };

        let page = match self.page {
            None => config.default_page,
            Some(value) => match value.parse::<u64>() {
                Ok(page) if page >= 1 => page,
                _ => {
                    errors.push(FieldError::new("page", "Page must be an integer of at least 1"));
                    config.default_page
                }
            },
        };

        let limit = match self.limit {
            None => config.default_page_size,
            Some(value) => match value.parse::<u64>() {
                Ok(limit) if (1..=config.max_page_size).contains(&limit) => limit,
                _ => {
                    errors.push(FieldError::new(
                        "limit",
                        format!("Limit must be between 1 and {}", config.max_page_size),
                    ));
                    config.default_page_size
                }
            },
        };

        if !errors.is_empty() {
            return Err(Error::InvalidFilters(errors));
        }

        Ok((filter, PageRequest { page, limit }))
    }
}

impl RecordFilter {
    /// Compile the filter into a SQL `WHERE` clause and its parameters.
    ///
    /// Returns an empty string when no criteria are set; otherwise the clause
    /// starts with `" WHERE "` so it can be appended to a query directly.
    pub(crate) fn to_where_clause(&self) -> (String, Vec<Value>) {
        let mut clause_parts = Vec::new();
        let mut parameters: Vec<Value> = Vec::new();

        push_in_clause(
            "expense_type",
            self.expense_types.iter().map(|t| Value::from(t.as_str().to_owned())),
            &mut clause_parts,
            &mut parameters,
        );
        push_in_clause(
            "category",
            self.categories.iter().map(|c| Value::from(c.as_str().to_owned())),
            &mut clause_parts,
            &mut parameters,
        );
        push_in_clause(
            "payment_method",
            self.payment_methods.iter().map(|m| Value::from(m.clone())),
            &mut clause_parts,
            &mut parameters,
        );
        push_in_clause(
            "month",
            self.months.iter().map(|m| Value::from(m.name().to_owned())),
            &mut clause_parts,
            &mut parameters,
        );
        push_in_clause(
            "year",
            self.years.iter().map(|y| Value::from(i64::from(*y))),
            &mut clause_parts,
            &mut parameters,
        );

        if let Some(from) = self.charge_date_from {
            clause_parts.push(format!("charge_date >= ?{}", parameters.len() + 1));
            parameters.push(Value::from(from.to_string()));
        }

        if let Some(to) = self.charge_date_to {
            clause_parts.push(format!("charge_date <= ?{}", parameters.len() + 1));
            parameters.push(Value::from(to.to_string()));
        }

        if let Some(flag) = self.is_installment {
            clause_parts.push(format!("is_installment = ?{}", parameters.len() + 1));
            parameters.push(Value::from(i64::from(flag)));
        }

        if let Some(flag) = self.is_split {
            clause_parts.push(format!("is_split = ?{}", parameters.len() + 1));
            parameters.push(Value::from(i64::from(flag)));
        }

        push_in_clause(
            "tag",
            self.tags.iter().map(|t| Value::from(t.clone())),
            &mut clause_parts,
            &mut parameters,
        );

        if clause_parts.is_empty() {
            (String::new(), parameters)
        } else {
            (format!(" WHERE {}", clause_parts.join(" AND ")), parameters)
        }
    }
}

/// Append `column IN (?n, ?n+1, ...)` for the given values; a no-op when the
/// value set is empty (an absent field imposes no constraint).
fn push_in_clause(
    column: &str,
    values: impl Iterator<Item = Value>,
    clause_parts: &mut Vec<String>,
    parameters: &mut Vec<Value>,
) {
    let start = parameters.len();
    parameters.extend(values);

    if parameters.len() == start {
        return;
    }

    let placeholders: Vec<String> = (start + 1..=parameters.len())
        .map(|index| format!("?{index}"))
        .collect();
    clause_parts.push(format!("{column} IN ({})", placeholders.join(", ")));
}

fn parse_values<T>(
    values: Vec<String>,
    field: &str,
    errors: &mut Vec<FieldError>,
    parse: impl Fn(&str) -> Result<T, &'static str>,
) -> Vec<T> {
    let mut parsed = Vec::with_capacity(values.len());

    for value in &values {
        match parse(value) {
            Ok(value) => parsed.push(value),
            Err(message) => {
                errors.push(FieldError::new(field, message));
            }
        }
    }

    parsed
}

fn parse_date(field: &str, value: &str, errors: &mut Vec<FieldError>) -> Option<Date> {
    let format = time::macros::format_description!("[year]-[month]-[day]");

    match Date::parse(value, format) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(FieldError::new(
                field,
                "Must be a valid date in YYYY-MM-DD format",
            ));
            None
        }
    }
}

fn parse_flag(field: &str, value: &str, errors: &mut Vec<FieldError>) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => {
            errors.push(FieldError::new(field, "Must be \"true\" or \"false\""));
            None
        }
    }
}
