//! Transaction rows extracted from a statement

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// One statement row as returned by the extraction service.
///
/// Field names match the wire format and the exported CSV header.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    /// Date of the transaction (YYYY-MM-DD)
    pub transaction_date: String,
    /// Merchant, payee or free-text description
    pub transaction_title_or_description: String,
    /// Negative = debit/outflow, positive = credit/inflow
    pub amount: f64,
    /// Categories, reference numbers, or ambiguity remarks
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
}

/// `null` and a missing key both read as an empty string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Money direction, derived from the sign of `amount`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Direction {
    #[serde(rename = "debit")]
    Debit,
    #[serde(rename = "credit")]
    Credit,
}

impl Transaction {
    pub fn new(
        transaction_date: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            transaction_date: transaction_date.into(),
            transaction_title_or_description: description.into(),
            amount,
            notes: notes.into(),
        }
    }

    /// `amount < 0` is a debit; zero and positive amounts are credits.
    pub fn direction(&self) -> Direction {
        if self.amount < 0.0 {
            Direction::Debit
        } else {
            Direction::Credit
        }
    }

    pub fn is_debit(&self) -> bool {
        self.direction() == Direction::Debit
    }

    pub fn is_credit(&self) -> bool {
        self.direction() == Direction::Credit
    }

    /// Parsed date, or `None` when the model returned something other than YYYY-MM-DD.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.transaction_date.trim(), "%Y-%m-%d").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_sign() {
        let coffee = Transaction::new("2024-03-01", "Coffee Shop", -4.5, "");
        let salary = Transaction::new("2024-03-02", "Payroll", 2500.0, "");
        let zero = Transaction::new("2024-03-03", "Fee waiver", 0.0, "");

        assert_eq!(coffee.direction(), Direction::Debit);
        assert!(coffee.is_debit());
        assert_eq!(salary.direction(), Direction::Credit);
        assert_eq!(zero.direction(), Direction::Credit);
    }

    #[test]
    fn test_parsed_date() {
        let t = Transaction::new("2024-03-01", "Coffee Shop", -4.5, "");
        assert_eq!(t.parsed_date(), NaiveDate::from_ymd_opt(2024, 3, 1));

        let bad = Transaction::new("03/01/2024", "Coffee Shop", -4.5, "date unclear");
        assert_eq!(bad.parsed_date(), None);
    }

    #[test]
    fn test_missing_notes_defaults_to_empty() {
        let json = r#"{"transaction_date":"2024-03-01","transaction_title_or_description":"Coffee Shop","amount":-4.5}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.notes, "");
        assert_eq!(t.amount, -4.5);
    }

    #[test]
    fn test_null_notes_defaults_to_empty() {
        let json = r#"{"transaction_date":"2024-03-01","transaction_title_or_description":"Coffee Shop","amount":-4.5,"notes":null}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.notes, "");

        let json = r#"{"transaction_date":"2024-03-01","transaction_title_or_description":"Coffee Shop","amount":-4.5,"notes":"ref 1042"}"#;
        let t: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(t.notes, "ref 1042");
    }
}
