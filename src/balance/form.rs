//! Request payloads and validation for creating and updating balance items.

use serde::Deserialize;
use time::OffsetDateTime;

use crate::{
    Error,
    balance::core::{BalanceItem, BalanceItemDraft, BalanceType},
    response::FieldError,
};

/// The JSON body for creating or updating a balance item.
///
/// Every field is optional so that validation can report all missing required
/// fields at once.
#[derive(Debug, Default, Deserialize)]
pub struct BalanceItemPayload {
    /// The balance type code, "D" (debit) or "C" (credit).
    pub balance_type: Option<String>,
    /// A text label for the account or entry.
    pub concept: Option<String>,
    /// The actual amount observed.
    pub amount: Option<f64>,
    /// The amount the entry should be; defaults to 0.
    pub expected_amount: Option<f64>,
    /// The gap between actual and expected.
    pub difference: Option<f64>,
    /// Free-text notes about the entry.
    pub comments: Option<String>,
}

/// A validated partial update for a balance item. `None` fields keep the
/// stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceItemChanges {
    /// New balance type, if changed.
    pub balance_type: Option<BalanceType>,
    /// New concept, if changed.
    pub concept: Option<String>,
    /// New amount, if changed.
    pub amount: Option<f64>,
    /// New expected amount, if changed.
    pub expected_amount: Option<f64>,
    /// New difference, if changed. The inner option allows storing a value;
    /// clearing an already stored difference is not supported over the API.
    pub difference: Option<Option<f64>>,
    /// New comments, if changed.
    pub comments: Option<Option<String>>,
}

impl BalanceItemChanges {
    /// Merge the changes onto `existing`, refreshing `updated_at` to `now`.
    pub(crate) fn apply(self, existing: BalanceItem, now: OffsetDateTime) -> BalanceItem {
        BalanceItem {
            id: existing.id,
            balance_type: self.balance_type.unwrap_or(existing.balance_type),
            concept: self.concept.unwrap_or(existing.concept),
            amount: self.amount.unwrap_or(existing.amount),
            expected_amount: self.expected_amount.unwrap_or(existing.expected_amount),
            difference: self.difference.unwrap_or(existing.difference),
            comments: self.comments.unwrap_or(existing.comments),
            created_at: existing.created_at,
            updated_at: now,
        }
    }
}

impl BalanceItemPayload {
    /// Validate the payload as a full create request.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] with one entry per offending field.
    pub fn validate_create(self) -> Result<BalanceItemDraft, Error> {
        let mut errors = Vec::new();

        let balance_type = match &self.balance_type {
            None => {
                errors.push(FieldError::new("balance_type", "Balance type is required"));
                None
            }
            Some(value) => parse_balance_type(value, &mut errors),
        };
        let concept = match self.concept {
            None => {
                errors.push(FieldError::new("concept", "Concept is required"));
                None
            }
            Some(concept) => validate_concept(concept, &mut errors),
        };
        let amount = match self.amount {
            None => {
                errors.push(FieldError::new("amount", "Amount is required"));
                None
            }
            Some(amount) => validate_amount("amount", amount, &mut errors),
        };
        let expected_amount = self
            .expected_amount
            .map_or(Some(0.0), |value| validate_amount("expected_amount", value, &mut errors));
        let difference = match self.difference {
            None => Some(None),
            Some(value) => validate_amount("difference", value, &mut errors).map(Some),
        };
        let comments = match self.comments {
            None => Some(None),
            Some(comments) => validate_comments(comments, &mut errors).map(Some),
        };

        if !errors.is_empty() {
            return Err(Error::InvalidInput(errors));
        }

        Ok(BalanceItemDraft {
            balance_type: balance_type.unwrap(),
            concept: concept.unwrap(),
            amount: amount.unwrap(),
            expected_amount: expected_amount.unwrap(),
            difference: difference.unwrap(),
            comments: comments.unwrap(),
        })
    }

    /// Validate the payload as a partial update: only the supplied fields are
    /// checked.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] with one entry per offending field.
    pub fn validate_update(self) -> Result<BalanceItemChanges, Error> {
        let mut errors = Vec::new();

        let changes = BalanceItemChanges {
            balance_type: self
                .balance_type
                .and_then(|value| parse_balance_type(&value, &mut errors)),
            concept: self
                .concept
                .and_then(|concept| validate_concept(concept, &mut errors)),
            amount: self
                .amount
                .and_then(|amount| validate_amount("amount", amount, &mut errors)),
            expected_amount: self.expected_amount.and_then(|value| {
                validate_amount("expected_amount", value, &mut errors)
            }),
            difference: self
                .difference
                .and_then(|value| validate_amount("difference", value, &mut errors))
                .map(Some),
            comments: self
                .comments
                .and_then(|comments| validate_comments(comments, &mut errors))
                .map(Some),
        };

        if !errors.is_empty() {
            return Err(Error::InvalidInput(errors));
        }

        Ok(changes)
    }
}

fn parse_balance_type(value: &str, errors: &mut Vec<FieldError>) -> Option<BalanceType> {
    let balance_type = BalanceType::from_code(value);

    if balance_type.is_none() {
        errors.push(FieldError::new(
            "balance_type",
            "Balance type must be one of: D, C",
        ));
    }

    balance_type
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

fn validate_amount(field: &str, amount: f64, errors: &mut Vec<FieldError>) -> Option<f64> {
    let scaled = amount * 100.0;

    if !amount.is_finite() || (scaled - scaled.round()).abs() > 1e-6 {
        errors.push(FieldError::new(
            field,
            "Amount must have at most 2 decimal places",
        ));
        return None;
    }

    Some(amount)
}

fn validate_comments(comments: String, errors: &mut Vec<FieldError>) -> Option<String> {
    if comments.chars().count() > 255 {
        errors.push(FieldError::new(
            "comments",
            "Comments must be at most 255 characters",
        ));
        return None;
    }

    Some(comments)
}

#[cfg(test)]
mod tests {
    use crate::{Error, balance::core::BalanceType};

    use super::BalanceItemPayload;

    #[test]
    fn valid_create_payload_defaults_the_expected_amount() {
        let payload = BalanceItemPayload {
            balance_type: Some("D".to_owned()),
            concept: Some("Nu débito".to_owned()),
            amount: Some(1500.0),
            ..BalanceItemPayload::default()
        };

        let draft = payload.validate_create().unwrap();

        assert_eq!(draft.balance_type, BalanceType::Debit);
        assert_eq!(draft.expected_amount, 0.0);
        assert_eq!(draft.difference, None);
        assert_eq!(draft.comments, None);
    }

    #[test]
    fn create_collects_every_missing_required_field() {
        let Err(Error::InvalidInput(errors)) = BalanceItemPayload::default().validate_create()
        else {
            panic!("expected a validation error");
        };

        let fields: Vec<&str> = errors.iter().map(|error| error.field.as_str()).collect();
        assert_eq!(fields, vec!["balance_type", "concept", "amount"]);
    }

    #[test]
    fn update_rejects_an_unknown_balance_type() {
        let payload = BalanceItemPayload {
            balance_type: Some("X".to_owned()),
            ..BalanceItemPayload::default()
        };

        let Err(Error::InvalidInput(errors)) = payload.validate_update() else {
            panic!("expected a validation error");
        };

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "balance_type");
    }
}
