//! Request payloads and validation for creating and updating debts.

use serde::Deserialize;
use time::{Date, OffsetDateTime, macros::format_description};

use crate::{
    Error,
    debt::core::{Debt, DebtDraft, DebtType},
    response::FieldError,
};

/// The JSON body for creating or updating a debt.
///
/// Every field is optional so that validation can report all missing required
/// fields at once.
#[derive(Debug, Default, Deserialize)]
pub struct DebtPayload {
    /// The debt type code, "T" (card) or "O" (other).
    pub debt_type: Option<String>,
    /// A text label for the liability.
    pub item: Option<String>,
    /// The outstanding amount.
    pub amount: Option<f64>,
    /// The date the amount was observed, in YYYY-MM-DD format.
    pub date: Option<String>,
}

/// A validated partial update for a debt. `None` fields keep the stored
/// value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebtChanges {
    /// New debt type, if changed.
    pub debt_type: Option<DebtType>,
    /// New item label, if changed.
    pub item: Option<String>,
    /// New amount, if changed.
    pub amount: Option<f64>,
    /// New observation date, if changed.
    pub date: Option<Date>,
}

impl DebtChanges {
    /// Merge the changes onto `existing`, refreshing `updated_at` to `now`.
    pub(crate) fn apply(self, existing: Debt, now: OffsetDateTime) -> Debt {
        Debt {
            id: existing.id,
            debt_type: self.debt_type.unwrap_or(existing.debt_type),
            item: self.item.unwrap_or(existing.item),
            amount: self.amount.unwrap_or(existing.amount),
            date: self.date.unwrap_or(existing.date),
            created_at: existing.created_at,
            updated_at: now,
        }
    }
}

impl DebtPayload {
    /// Validate the payload as a full create request.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] with one entry per offending field.
    pub fn validate_create(self) -> Result<DebtDraft, Error> {
        let mut errors = Vec::new();

        let debt_type = match &self.debt_type {
            None => {
                errors.push(FieldError::new("debt_type", "Debt type is required"));
                None
            }
            Some(value) => parse_debt_type(value, &mut errors),
        };
        let item = match self.item {
            None => {
                errors.push(FieldError::new("item", "Item is required"));
                None
            }
            Some(item) => validate_item(item, &mut errors),
        };
        let amount = match self.amount {
            None => {
                errors.push(FieldError::new("amount", "Amount is required"));
                None
            }
            Some(amount) => validate_amount(amount, &mut errors),
        };
        let date = match &self.date {
            None => {
                errors.push(FieldError::new("date", "Date is required"));
                None
            }
            Some(value) => parse_date(value, &mut errors),
        };

        if !errors.is_empty() {
            return Err(Error::InvalidInput(errors));
        }

        Ok(DebtDraft {
            debt_type: debt_type.unwrap(),
            item: item.unwrap(),
            amount: amount.unwrap(),
            date: date.unwrap(),
        })
    }

    /// Validate the payload as a partial update: only the supplied fields are
    /// checked.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] with one entry per offending field.
    pub fn validate_update(self) -> Result<DebtChanges, Error> {
        let mut errors = Vec::new();

        let changes = DebtChanges {
            debt_type: self
                .debt_type
                .and_then(|value| parse_debt_type(&value, &mut errors)),
            item: self.item.and_then(|item| validate_item(item, &mut errors)),
            amount: self
                .amount
                .and_then(|amount| validate_amount(amount, &mut errors)),
            date: self.date.and_then(|value| parse_date(&value, &mut errors)),
        };

        if !errors.is_empty() {
            return Err(Error::InvalidInput(errors));
        }

        Ok(changes)
    }
}

fn parse_debt_type(value: &str, errors: &mut Vec<FieldError>) -> Option<DebtType> {
    let debt_type = DebtType::from_code(value);

    if debt_type.is_none() {
        errors.push(FieldError::new("debt_type", "Debt type must be one of: T, O"));
    }

    debt_type
}

fn validate_item(item: String, errors: &mut Vec<FieldError>) -> Option<String> {
    if item.is_empty() || item.chars().count() > 255 {
        errors.push(FieldError::new(
            "item",
            "Item must be between 1 and 255 characters",
        ));
        return None;
    }

    Some(item)
}

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

fn parse_date(value: &str, errors: &mut Vec<FieldError>) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");

    match Date::parse(value, format) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(FieldError::new(
                "date",
                "Must be a valid date in YYYY-MM-DD format",
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{Error, debt::core::DebtType};

    use super::DebtPayload;

    #[test]
    fn valid_create_payload_produces_a_draft() {
        let payload = DebtPayload {
            debt_type: Some("T".to_owned()),
            item: Some("BBVA Oro".to_owned()),
            amount: Some(5300.0),
            date: Some("2025-08-01".to_owned()),
        };

        let draft = payload.validate_create().unwrap();

        assert_eq!(draft.debt_type, DebtType::Card);
        assert_eq!(draft.item, "BBVA Oro");
        assert_eq!(draft.date, date!(2025 - 08 - 01));
    }

    #[test]
    fn create_collects_every_missing_required_field() {
        let Err(Error::InvalidInput(errors)) = DebtPayload::default().validate_create() else {
            panic!("expected a validation error");
        };

        let fields: Vec<&str> = errors.iter().map(|error| error.field.as_str()).collect();
        assert_eq!(fields, vec!["debt_type", "item", "amount", "date"]);
    }

    #[test]
    fn update_rejects_an_unknown_debt_type() {
        let payload = DebtPayload {
            debt_type: Some("X".to_owned()),
            ..DebtPayload::default()
        };

        let Err(Error::InvalidInput(errors)) = payload.validate_update() else {
            panic!("expected a validation error");
        };

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "debt_type");
    }
}
