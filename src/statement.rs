//! Bank-statement CSV loading.
//!
//! Expected header: `date,amount,direction,memo,balance`. `direction` is
//! `credit` or `debit`; when it is left empty the sign of `amount` decides.
//! `balance` is optional.

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use core_types::{Direction, Transaction};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct StatementRow {
    date: NaiveDate,
    amount: Decimal,
    #[serde(default)]
    direction: Option<Direction>,
    memo: String,
    #[serde(default)]
    balance: Option<Decimal>,
}

impl StatementRow {
    fn into_transaction(self) -> Result<Transaction> {
        let (amount, direction) = match self.direction {
            Some(direction) if self.amount.is_sign_negative() && !self.amount.is_zero() => {
                bail!("amount {} is negative but direction is {direction:?}", self.amount)
            }
            Some(direction) => (self.amount, direction),
            None if self.amount.is_sign_negative() => (self.amount.abs(), Direction::Debit),
            None => (self.amount, Direction::Credit),
        };
        Ok(Transaction::new(self.date, amount, direction, self.memo, self.balance)?)
    }
}

pub fn read_statement<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    csv.deserialize::<StatementRow>()
        .enumerate()
        .map(|(i, row)| {
            // Line 1 is the header.
            let line = i + 2;
            row.with_context(|| format!("Malformed statement row on line {line}"))?
                .into_transaction()
                .with_context(|| format!("Invalid transaction on line {line}"))
        })
        .collect()
}

pub fn load_statement(path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(path).with_context(|| format!("Failed to open statement {}", path.display()))?;
    let transactions = read_statement(file)?;
    tracing::info!(path = %path.display(), transactions = transactions.len(), "Statement loaded");
    Ok(transactions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Write;

    #[test]
    fn test_reads_explicit_and_signed_rows() {
        let data = "\
date,amount,direction,memo,balance
2024-03-01,1250.00,credit,SQUARE DEPOSIT,8250.00
2024-03-01,-300.00,,ONDECK ACH PMT,7950.00
2024-03-02,75.10,debit,NSF FEE,
";
        let transactions = read_statement(data.as_bytes()).unwrap();

        assert_eq!(transactions.len(), 3);
        assert_eq!(transactions[0].direction, Direction::Credit);
        assert_eq!(transactions[0].balance, Some(dec!(8250.00)));
        assert_eq!(transactions[1].direction, Direction::Debit);
        assert_eq!(transactions[1].amount, dec!(300.00));
        assert_eq!(transactions[2].memo, "NSF FEE");
        assert_eq!(transactions[2].balance, None);
    }

    #[test]
    fn test_negative_amount_with_direction_is_rejected() {
        let data = "date,amount,direction,memo,balance\n2024-03-01,-5,debit,FEE,\n";
        let err = read_statement(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_bad_date_reports_line() {
        let data = "date,amount,direction,memo,balance\n2024-03-01,5,credit,OK,\n03/02/2024,5,credit,BAD,\n";
        let err = read_statement(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_load_statement_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,amount,direction,memo,balance").unwrap();
        writeln!(file, "2024-01-05,900,credit,CLOVER SETTLEMENT,1900").unwrap();
        let transactions = load_statement(file.path()).unwrap();
        assert_eq!(transactions.len(), 1);
    }
}
