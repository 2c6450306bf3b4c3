//! Shared helpers for tests that need seeded records.

use time::Date;

use crate::record::models::{Category, ExpenseType, Month, RecordDraft};

/// Build a draft with sensible defaults for the fields a test does not care
/// about. The charge and pay dates fall inside the attributed month.
pub(crate) fn record_draft(
    concept: &str,
    amount: f64,
    category: Category,
    month: Month,
    year: i32,
) -> RecordDraft {
    let calendar_month = time::Month::try_from(month.ordinal()).expect("ordinal is 1-12");
    let charge_date = Date::from_calendar_date(year, calendar_month, 15).expect("valid date");

    RecordDraft {
        concept: concept.to_owned(),
        amount,
        expense_type: ExpenseType::Fixed,
        payment_method: "Efectivo".to_owned(),
        month,
        year,
        charge_date,
        pay_date: charge_date,
        category,
        is_installment: false,
        installment_index: 0,
        installment_total: 0,
        tag: "NA".to_owned(),
        is_split: false,
        monthly_label: "NA".to_owned(),
    }
}
