//! Per-statement totals shown next to extracted rows

use chrono::NaiveDate;
use serde::Serialize;

use crate::transaction::Transaction;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatementSummary {
    pub count: usize,
    /// Sum of positive amounts
    pub total_credits: f64,
    /// Sum of negative amounts (stays negative)
    pub total_debits: f64,
    pub earliest: Option<NaiveDate>,
    pub latest: Option<NaiveDate>,
}

impl StatementSummary {
    pub fn from_transactions(txns: &[Transaction]) -> Self {
        let mut summary = Self {
            count: txns.len(),
            ..Self::default()
        };

        for t in txns {
            if t.amount > 0.0 {
                summary.total_credits += t.amount;
            } else if t.amount < 0.0 {
                summary.total_debits += t.amount;
            }

            if let Some(d) = t.parsed_date() {
                summary.earliest = Some(summary.earliest.map_or(d, |e| e.min(d)));
                summary.latest = Some(summary.latest.map_or(d, |l| l.max(d)));
            }
        }

        summary
    }

    pub fn net(&self) -> f64 {
        self.total_credits + self.total_debits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_totals() {
        let txns = vec![
            Transaction::new("2024-03-05", "Payroll", 1200.0, ""),
            Transaction::new("2024-03-01", "Coffee Shop", -4.5, ""),
            Transaction::new("2024-03-09", "Rent", -800.0, ""),
            Transaction::new("unknown", "Adjustment", 0.0, "date unreadable"),
        ];

        let s = StatementSummary::from_transactions(&txns);
        assert_eq!(s.count, 4);
        assert_eq!(s.total_credits, 1200.0);
        assert_eq!(s.total_debits, -804.5);
        assert_eq!(s.net(), 395.5);
        assert_eq!(s.earliest, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(s.latest, NaiveDate::from_ymd_opt(2024, 3, 9));
    }

    #[test]
    fn test_summary_empty() {
        let s = StatementSummary::from_transactions(&[]);
        assert_eq!(s, StatementSummary::default());
        assert_eq!(s.net(), 0.0);
    }
}
