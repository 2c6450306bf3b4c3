//! Defines the core data models for expense/income records.

use rusqlite::{
    ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::database_id::RecordId;

/// Whether a record is money going out or coming in.
///
/// The wire codes "E" (egreso/expense) and "I" (ingreso/income) are kept from
/// the source data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    /// Money spent.
    #[serde(rename = "E")]
    Expense,
    /// Money earned.
    #[serde(rename = "I")]
    Income,
}

impl Category {
    /// All categories, in catalog order.
    pub const ALL: [Category; 2] = [Category::Expense, Category::Income];

    /// The single-letter wire code for the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Expense => "E",
            Category::Income => "I",
        }
    }

    /// A human readable name for the category.
    pub fn description(&self) -> &'static str {
        match self {
            Category::Expense => "Expense",
            Category::Income => "Income",
        }
    }

    /// Parse a wire code, e.g. "E".
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.as_str() == code)
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Category::from_code(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// The spending pattern of a record.
///
/// The wire strings are the Spanish labels used by the source data:
/// "Fijo", "Variable", "MSI" (meses sin intereses) and "MCI" (meses con
/// intereses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExpenseType {
    /// A fixed, recurring monthly expense such as rent.
    #[serde(rename = "Fijo")]
    Fixed,
    /// A one-off or fluctuating expense.
    #[serde(rename = "Variable")]
    Variable,
    /// An interest-free installment plan.
    #[serde(rename = "MSI")]
    Msi,
    /// An interest-bearing installment plan.
    #[serde(rename = "MCI")]
    Mci,
}

impl ExpenseType {
    /// All expense types, in catalog order.
    pub const ALL: [ExpenseType; 4] = [
        ExpenseType::Fixed,
        ExpenseType::Variable,
        ExpenseType::Msi,
        ExpenseType::Mci,
    ];

    /// The expense types that describe multi-month installment plans.
    pub const INSTALLMENT_TYPES: [ExpenseType; 2] = [ExpenseType::Msi, ExpenseType::Mci];

    /// The wire string for the expense type, e.g. "Fijo".
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpenseType::Fixed => "Fijo",
            ExpenseType::Variable => "Variable",
            ExpenseType::Msi => "MSI",
            ExpenseType::Mci => "MCI",
        }
    }

    /// A human readable name for the expense type.
    pub fn description(&self) -> &'static str {
        match self {
            ExpenseType::Fixed => "Fixed monthly expense",
            ExpenseType::Variable => "Variable expense",
            ExpenseType::Msi => "Interest-free installments",
            ExpenseType::Mci => "Interest-bearing installments",
        }
    }

    /// Parse a wire string, e.g. "MSI".
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|expense_type| expense_type.as_str() == name)
    }
}

impl FromSql for ExpenseType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        ExpenseType::from_name(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for ExpenseType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

/// The billing month a record is attributed to.
///
/// Records carry a denormalized month/year pair that is independent of
/// `charge_date`/`pay_date`, since a statement can be attributed to a billing
/// period different from the transaction date. The wire names are the Spanish
/// month names used by the source data.
///
/// Sorting grouped-by-month aggregates MUST use [Month::ordinal], never the
/// name itself: the lexical order of Spanish month names is not calendar
/// order ("Agosto" sorts before "Febrero").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Month {
    /// Enero
    #[serde(rename = "Enero")]
    January,
    /// Febrero
    #[serde(rename = "Febrero")]
    February,
    /// Marzo
    #[serde(rename = "Marzo")]
    March,
    /// Abril
    #[serde(rename = "Abril")]
    April,
    /// Mayo
    #[serde(rename = "Mayo")]
    May,
    /// Junio
    #[serde(rename = "Junio")]
    June,
    /// Julio
    #[serde(rename = "Julio")]
    July,
    /// Agosto
    #[serde(rename = "Agosto")]
    August,
    /// Septiembre
    #[serde(rename = "Septiembre")]
    September,
    /// Octubre
    #[serde(rename = "Octubre")]
    October,
    /// Noviembre
    #[serde(rename = "Noviembre")]
    November,
    /// Diciembre
    #[serde(rename = "Diciembre")]
    December,
}

impl Month {
    /// All months in calendar order.
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    /// The Spanish month name, e.g. "Agosto".
    pub fn name(&self) -> &'static str {
        match self {
            Month::January => "Enero",
            Month::February => "Febrero",
            Month::March => "Marzo",
            Month::April => "Abril",
            Month::May => "Mayo",
            Month::June => "Junio",
            Month::July => "Julio",
            Month::August => "Agosto",
            Month::September => "Septiembre",
            Month::October => "Octubre",
            Month::November => "Noviembre",
            Month::December => "Diciembre",
        }
    }

    /// The calendar position of the month, 1 (Enero) through 12 (Diciembre).
    pub fn ordinal(&self) -> u8 {
        Self::ALL
            .iter()
            .position(|month| month == self)
            .expect("every month is in Month::ALL") as u8
            + 1
    }

    /// Parse a Spanish month name, e.g. "Agosto".
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|month| month.name() == name)
    }
}

impl FromSql for Month {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Month::from_name(value.as_str()?).ok_or(FromSqlError::InvalidType)
    }
}

impl ToSql for Month {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.name()))
    }
}

/// An expense or income, i.e. an event where money was either spent or earned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// The ID of the record.
    pub id: RecordId,
    /// A text label for what the money was spent on or earned from.
    pub concept: String,
    /// The amount of money involved.
    ///
    /// The sign is independent of [Record::category]: a negative amount under
    /// an income category represents a refund-like adjustment.
    pub amount: f64,
    /// The spending pattern of the record.
    pub expense_type: ExpenseType,
    /// The card or account the record was paid with.
    pub payment_method: String,
    /// The billing month the record is attributed to.
    pub month: Month,
    /// The billing year the record is attributed to.
    pub year: i32,
    /// When the charge hit the account.
    pub charge_date: Date,
    /// When the charge was (or will be) paid off.
    pub pay_date: Date,
    /// Whether the record is an expense or an income.
    pub category: Category,
    /// Whether the record is paid in installments.
    pub is_installment: bool,
    /// The 1-based position within the installment plan, 0 when not an
    /// installment.
    pub installment_index: u32,
    /// The total number of installments, 0 when not an installment.
    pub installment_total: u32,
    /// A free-text classification tag, "NA" when unset.
    pub tag: String,
    /// Whether the cost is split with someone else.
    pub is_split: bool,
    /// A free-text label for the monthly expense group, "NA" when unset.
    pub monthly_label: String,
    /// When the record was created, server-assigned.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the record was last updated, server-assigned.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A fully validated payload for inserting a new record.
///
/// Produced by `RecordPayload::validate_create`, consumed by
/// `insert_record`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDraft {
    /// A text label for what the money was spent on or earned from.
    pub concept: String,
    /// The amount of money involved, signed.
    pub amount: f64,
    /// The spending pattern of the record.
    pub expense_type: ExpenseType,
    /// The card or account the record was paid with.
    pub payment_method: String,
    /// The billing month the record is attributed to.
    pub month: Month,
    /// The billing year the record is attributed to.
    pub year: i32,
    /// When the charge hit the account.
    pub charge_date: Date,
    /// When the charge was (or will be) paid off.
    pub pay_date: Date,
    /// Whether the record is an expense or an income.
    pub category: Category,
    /// Whether the record is paid in installments.
    pub is_installment: bool,
    /// The 1-based position within the installment plan.
    pub installment_index: u32,
    /// The total number of installments.
    pub installment_total: u32,
    /// A free-text classification tag.
    pub tag: String,
    /// Whether the cost is split with someone else.
    pub is_split: bool,
    /// A free-text label for the monthly expense group.
    pub monthly_label: String,
}
