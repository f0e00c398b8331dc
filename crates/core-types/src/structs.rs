use crate::enums::{Direction, TransactionCategory, TransactionFlag};
use crate::error::CoreError;
use crate::flags::FlagSet;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single statement line as produced by document extraction.
///
/// `amount` is always a non-negative magnitude; `direction` carries the sign.
/// Deserialization goes through `Transaction::new`, so decoded input gets
/// the same checks as constructed input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TransactionFields")]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub direction: Direction,
    pub memo: String,
    /// Running balance after this line, when the statement prints one.
    pub balance: Option<Decimal>,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        amount: Decimal,
        direction: Direction,
        memo: impl Into<String>,
        balance: Option<Decimal>,
    ) -> Result<Self, CoreError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(CoreError::InvalidInput(
                "amount".to_string(),
                format!("{amount} is negative; use Direction::Debit instead"),
            ));
        }
        Ok(Self {
            date,
            amount,
            direction,
            memo: memo.into(),
            balance,
        })
    }

    pub fn credit(date: NaiveDate, amount: Decimal, memo: impl Into<String>) -> Result<Self, CoreError> {
        Self::new(date, amount, Direction::Credit, memo, None)
    }

    pub fn debit(date: NaiveDate, amount: Decimal, memo: impl Into<String>) -> Result<Self, CoreError> {
        Self::new(date, amount, Direction::Debit, memo, None)
    }

    /// Returns a copy carrying the given running balance.
    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = Some(balance);
        self
    }

    /// Positive for credits, negative for debits.
    pub fn signed_amount(&self) -> Decimal {
        match self.direction {
            Direction::Credit => self.amount,
            Direction::Debit => -self.amount,
        }
    }

    pub fn is_credit(&self) -> bool {
        self.direction.is_credit()
    }
}

#[derive(Deserialize)]
struct TransactionFields {
    date: NaiveDate,
    amount: Decimal,
    direction: Direction,
    memo: String,
    balance: Option<Decimal>,
}

impl TryFrom<TransactionFields> for Transaction {
    type Error = CoreError;

    fn try_from(fields: TransactionFields) -> Result<Self, Self::Error> {
        Transaction::new(fields.date, fields.amount, fields.direction, fields.memo, fields.balance)
    }
}

impl AsRef<Transaction> for Transaction {
    fn as_ref(&self) -> &Transaction {
        self
    }
}

/// A transaction after the classification rules have run over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedTransaction {
    pub transaction: Transaction,
    pub category: TransactionCategory,
    pub flags: FlagSet,
    /// Canonical lender name when a lender alias rule matched.
    pub lender: Option<String>,
    /// Id of the rule that decided `category`; `None` for the silent fallback.
    pub rule_id: Option<String>,
}

impl ClassifiedTransaction {
    pub fn has_flag(&self, flag: TransactionFlag) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_true_revenue(&self) -> bool {
        self.category == TransactionCategory::TrueRevenue
    }

    pub fn date(&self) -> NaiveDate {
        self.transaction.date
    }

    pub fn amount(&self) -> Decimal {
        self.transaction.amount
    }

    pub fn is_credit(&self) -> bool {
        self.transaction.is_credit()
    }
}

impl AsRef<Transaction> for ClassifiedTransaction {
    fn as_ref(&self) -> &Transaction {
        &self.transaction
    }
}

/// Applicant details supplied directly by the caller.
///
/// Fields that scoring cannot do without are optional here so that an
/// incomplete application is reported as a validation error instead of
/// being scored with made-up defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationData {
    pub business_name: String,
    pub credit_score: Option<u16>,
    pub time_in_business_months: Option<u32>,
    pub industry_code: Option<String>,
    /// Average monthly card-processing volume.
    pub processing_volume: Option<Decimal>,
    pub processor_tenure_months: Option<u32>,
    pub state: Option<String>,
}

impl ApplicationData {
    pub fn has_processing_history(&self) -> bool {
        self.processing_volume.is_some_and(|v| v > Decimal::ZERO)
    }
}
