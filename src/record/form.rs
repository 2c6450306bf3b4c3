//! Request payloads and validation for creating and updating records.
//!
//! Validation collects every violation before failing, so a response always
//! carries the complete list of field errors rather than just the first one.

use serde::Deserialize;
use time::{Date, OffsetDateTime, macros::format_description};

use crate::{
    Error,
    record::models::{Category, ExpenseType, Month, Record, RecordDraft},
    response::FieldError,
};

/// The default value for the free-text `tag` and `monthly_label` fields.
pub(crate) const UNSET_LABEL: &str = "NA";

/// The JSON body for creating or updating a record.
///
/// Every field is optional so that validation can report all missing required
/// fields at once. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct RecordPayload {
    /// A text label for the record.
    pub concept: Option<String>,
    /// The signed amount of money involved.
    pub amount: Option<f64>,
    /// The spending pattern, e.g. "Fijo".
    pub expense_type: Option<String>,
    /// The card or account used.
    pub payment_method: Option<String>,
    /// The Spanish billing month name, e.g. "Agosto".
    pub month: Option<String>,
    /// The billing year.
    pub year: Option<i64>,
    /// The charge date in YYYY-MM-DD format.
    pub charge_date: Option<String>,
    /// The pay date in YYYY-MM-DD format.
    pub pay_date: Option<String>,
    /// The category code, "E" or "I".
    pub category: Option<String>,
    /// Whether the record is paid in installments.
    pub is_installment: Option<bool>,
    /// The position within the installment plan.
    pub installment_index: Option<i64>,
    /// The total number of installments.
    pub installment_total: Option<i64>,
    /// A free-text classification tag.
    pub tag: Option<String>,
    /// Whether the cost is split with someone else.
    pub is_split: Option<bool>,
    /// A free-text label for the monthly expense group.
    pub monthly_label: Option<String>,
}

/// A validated partial update for a record.
///
/// `None` fields keep the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordChanges {
    /// New concept, if changed.
    pub concept: Option<String>,
    /// New amount, if changed.
    pub amount: Option<f64>,
    /// New expense type, if changed.
    pub expense_type: Option<ExpenseType>,
    /// New payment method, if changed.
    pub payment_method: Option<String>,
    /// New billing month, if changed.
    pub month: Option<Month>,
    /// New billing year, if changed.
    pub year: Option<i32>,
    /// New charge date, if changed.
    pub charge_date: Option<Date>,
    /// New pay date, if changed.
    pub pay_date: Option<Date>,
    /// New category, if changed.
    pub category: Option<Category>,
    /// New installment flag, if changed.
    pub is_installment: Option<bool>,
    /// New installment index, if changed.
    pub installment_index: Option<u32>,
    /// New installment total, if changed.
    pub installment_total: Option<u32>,
    /// New tag, if changed.
    pub tag: Option<String>,
    /// New split flag, if changed.
    pub is_split: Option<bool>,
    /// New monthly label, if changed.
    pub monthly_label: Option<String>,
}

impl RecordChanges {
    /// Merge the changes onto `existing`, refreshing `updated_at` to `now`.
    pub(crate) fn apply(self, existing: Record, now: OffsetDateTime) -> Record {
        Record {
            id: existing.id,
            concept: self.concept.unwrap_or(existing.concept),
            amount: self.amount.unwrap_or(existing.amount),
            expense_type: self.expense_type.unwrap_or(existing.expense_type),
            payment_method: self.payment_method.unwrap_or(existing.payment_method),
            month: self.month.unwrap_or(existing.month),
            year: self.year.unwrap_or(existing.year),
            charge_date: self.charge_date.unwrap_or(existing.charge_date),
            pay_date: self.pay_date.unwrap_or(existing.pay_date),
            category: self.category.unwrap_or(existing.category),
            is_installment: self.is_installment.unwrap_or(existing.is_installment),
            installment_index: self.installment_index.unwrap_or(existing.installment_index),
            installment_total: self.installment_total.unwrap_or(existing.installment_total),
            tag: self.tag.unwrap_or(existing.tag),
            is_split: self.is_split.unwrap_or(existing.is_split),
            monthly_label: self.monthly_label.unwrap_or(existing.monthly_label),
            created_at: existing.created_at,
            updated_at: now,
        }
    }
}

impl RecordPayload {
    /// Validate the payload as a full create request.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] with one entry per offending field. All
    /// violations are collected, including every missing required field.
    pub fn validate_create(self) -> Result<RecordDraft, Error> {
        let mut errors = Vec::new();

        let concept = require(self.concept, "concept", "Concept is required", &mut errors)
            .and_then(|concept| validate_concept(concept, &mut errors));
        let amount = require(self.amount, "amount", "Amount is required", &mut errors)
            .and_then(|amount| validate_amount(amount, &mut errors));
        let expense_type = require(
            self.expense_type,
            "expense_type",
            "Expense type is required",
            &mut errors,
        )
        .and_then(|value| parse_expense_type(&value, &mut errors));
        let payment_method = require(
            self.payment_method,
            "payment_method",
            "Payment method is required",
            &mut errors,
        )
        .and_then(|value| validate_payment_method(value, &mut errors));
        let month = require(self.month, "month", "Month is required", &mut errors)
            .and_then(|value| parse_month(&value, &mut errors));
        let year = require(self.year, "year", "Year is required", &mut errors)
            .and_then(|year| validate_year(year, &mut errors));
        let charge_date = require(
            self.charge_date,
            "charge_date",
            "Charge date is required",
            &mut errors,
        )
        .and_then(|value| parse_date("charge_date", &value, &mut errors));
        let pay_date = require(self.pay_date, "pay_date", "Pay date is required", &mut errors)
            .and_then(|value| parse_date("pay_date", &value, &mut errors));
        let category = require(self.category, "category", "Category is required", &mut errors)
            .and_then(|value| parse_category(&value, &mut errors));

        let installment_index = self
            .installment_index
            .map_or(Some(0), |value| validate_count(value, "installment_index", &mut errors));
        let installment_total = self
            .installment_total
            .map_or(Some(0), |value| validate_count(value, "installment_total", &mut errors));
        let tag = self
            .tag
            .map_or(Some(UNSET_LABEL.to_owned()), |tag| validate_tag(tag, &mut errors));
        let monthly_label = self.monthly_label.map_or(Some(UNSET_LABEL.to_owned()), |label| {
            validate_monthly_label(label, &mut errors)
        });

        if !errors.is_empty() {
            return Err(Error::InvalidInput(errors));
        }

        // Every field is Some here: a None would have pushed an error above.
        Ok(RecordDraft {
            concept: concept.unwrap(),
            amount: amount.unwrap(),
            expense_type: expense_type.unwrap(),
            payment_method: payment_method.unwrap(),
            month: month.unwrap(),
            year: year.unwrap(),
            charge_date: charge_date.unwrap(),
            pay_date: pay_date.unwrap(),
            category: category.unwrap(),
            is_installment: self.is_installment.unwrap_or(false),
            installment_index: installment_index.unwrap(),
            installment_total: installment_total.unwrap(),
            tag: tag.unwrap(),
            is_split: self.is_split.unwrap_or(false),
            monthly_label: monthly_label.unwrap(),
        })
    }

    /// Validate the payload as a partial update: only the supplied fields are
    /// checked.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] with one entry per offending field.
    pub fn validate_update(self) -> Result<RecordChanges, Error> {
        let mut errors = Vec::new();

        let changes = RecordChanges {
            concept: self
                .concept
                .and_then(|concept| validate_concept(concept, &mut errors)),
            amount: self
                .amount
                .and_then(|amount| validate_amount(amount, &mut errors)),
            expense_type: self
                .expense_type
                .and_then(|value| parse_expense_type(&value, &mut errors)),
            payment_method: self
                .payment_method
                .and_then(|value| validate_payment_method(value, &mut errors)),
            month: self.month.and_then(|value| parse_month(&value, &mut errors)),
            year: self.year.and_then(|year| validate_year(year, &mut errors)),
            charge_date: self
                .charge_date
                .and_then(|value| parse_date("charge_date", &value, &mut errors)),
            pay_date: self
                .pay_date
                .and_then(|value| parse_date("pay_date", &value, &mut errors)),
            category: self
                .category
                .and_then(|value| parse_category(&value, &mut errors)),
            is_installment: self.is_installment,
            installment_index: self
                .installment_index
                .and_then(|value| validate_count(value, "installment_index", &mut errors)),
            installment_total: self
                .installment_total
                .and_then(|value| validate_count(value, "installment_total", &mut errors)),
            tag: self.tag.and_then(|tag| validate_tag(tag, &mut errors)),
            is_split: self.is_split,
            monthly_label: self
                .monthly_label
                .and_then(|label| validate_monthly_label(label, &mut errors)),
        };

        if !errors.is_empty() {
            return Err(Error::InvalidInput(errors));
        }

        Ok(changes)
    }
}

fn require<T>(
    value: Option<T>,
    field: &str,
    message: &str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    if value.is_none() {
        errors.push(FieldError::new(field, message));
    }

    value
}

fn validate_concept(concept: String, errors: &mut Vec<FieldError>) -> Option<String> {
    if concept.is_empty() || concept.chars().count() > 255 {
        errors.push(FieldError::new(
            "concept",
            "Concept must be between 1 and 255 characters",
        ));
        return None;
    }

    Some(concept)
}

/// Amounts are signed: the sign is independent of the category, so a refund
/// under an income category may be negative. Only the decimal precision is
/// constrained.
fn validate_amount(amount: f64, errors: &mut Vec<FieldError>) -> Option<f64> {
    let scaled = amount * 100.0;

    if !amount.is_finite() || (scaled - scaled.round()).abs() > 1e-6 {
        errors.push(FieldError::new(
            "amount",
            "Amount must have at most 2 decimal places",
        ));
        return None;
    }

    Some(amount)
}

fn parse_expense_type(value: &str, errors: &mut Vec<FieldError>) -> Option<ExpenseType> {
    let expense_type = ExpenseType::from_name(value);

    if expense_type.is_none() {
        errors.push(FieldError::new(
            "expense_type",
            "Expense type must be one of: Fijo, Variable, MSI, MCI",
        ));
    }

    expense_type
}

fn validate_payment_method(value: String, errors: &mut Vec<FieldError>) -> Option<String> {
    if value.is_empty() || value.chars().count() > 100 {
        errors.push(FieldError::new(
            "payment_method",
            "Payment method must be between 1 and 100 characters",
        ));
        return None;
    }

    Some(value)
}

fn parse_month(value: &str, errors: &mut Vec<FieldError>) -> Option<Month> {
    let month = Month::from_name(value);

    if month.is_none() {
        errors.push(FieldError::new(
            "month",
            "Month must be a Spanish month name, e.g. Agosto",
        ));
    }

    month
}

fn validate_year(year: i64, errors: &mut Vec<FieldError>) -> Option<i32> {
    if !(2000..=2100).contains(&year) {
        errors.push(FieldError::new("year", "Year must be between 2000 and 2100"));
        return None;
    }

    Some(year as i32)
}

fn parse_date(field: &str, value: &str, errors: &mut Vec<FieldError>) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");

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

fn parse_category(value: &str, errors: &mut Vec<FieldError>) -> Option<Category> {
    let category = Category::from_code(value);

    if category.is_none() {
        errors.push(FieldError::new("category", "Category must be one of: E, I"));
    }

    category
}

fn validate_count(value: i64, field: &str, errors: &mut Vec<FieldError>) -> Option<u32> {
    if !(0..=i64::from(u32::MAX)).contains(&value) {
        errors.push(FieldError::new(field, "Must not be negative"));
        return None;
    }

    Some(value as u32)
}

fn validate_tag(tag: String, errors: &mut Vec<FieldError>) -> Option<String> {
    if tag.chars().count() > 50 {
        errors.push(FieldError::new("tag", "Tag must be at most 50 characters"));
        return None;
    }

    Some(tag)
}

fn validate_monthly_label(label: String, errors: &mut Vec<FieldError>) -> Option<String> {
    if label.chars().count() > 20 {
        errors.push(FieldError::new(
            "monthly_label",
            "Monthly label must be at most 20 characters",
        ));
        return None;
    }

    Some(label)
}
