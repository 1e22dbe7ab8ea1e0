//! CSV export of extracted transactions

use stmtocr_core::Transaction;
use thiserror::Error;

pub const CSV_MIME: &str = "text/csv;charset=utf-8";

pub const CSV_HEADER: [&str; 4] = [
    "transaction_date",
    "transaction_title_or_description",
    "amount",
    "notes",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("csv output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Header plus one row per transaction, in input order, joined by `\n`.
///
/// Fields containing a comma, quote or line break are quoted with inner
/// quotes doubled. Amounts are written as plain numbers (`-4.5`, `100`).
pub fn to_csv(transactions: &[Transaction]) -> Result<String, ExportError> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADER)?;
    for t in transactions {
        let amount = t.amount.to_string();
        wtr.write_record([
            t.transaction_date.as_str(),
            t.transaction_title_or_description.as_str(),
            amount.as_str(),
            t.notes.as_str(),
        ])?;
    }

    let bytes = wtr.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;
    let mut out = String::from_utf8(bytes)?;
    // rows are separated, not terminated
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

/// `march.pdf` -> `march_converted.csv`; only the last extension is replaced.
pub fn converted_file_name(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(i) if i + 1 < name.len() && !name[i + 1..].contains('/') => &name[..i],
        _ => name,
    };
    format!("{stem}_converted.csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row_scenario() {
        let txns = vec![Transaction::new("2024-03-01", "Coffee Shop", -4.5, "")];
        assert_eq!(
            to_csv(&txns).unwrap(),
            "transaction_date,transaction_title_or_description,amount,notes\n2024-03-01,Coffee Shop,-4.5,"
        );
    }

    #[test]
    fn test_empty_is_header_only() {
        assert_eq!(
            to_csv(&[]).unwrap(),
            "transaction_date,transaction_title_or_description,amount,notes"
        );
    }

    #[test]
    fn test_escaping() {
        let txns = vec![Transaction::new("2024-03-02", "a,b\"c", 100.0, "line1\nline2")];
        let csv = to_csv(&txns).unwrap();
        let row = csv.split_once('\n').unwrap().1;
        assert_eq!(row, "2024-03-02,\"a,b\"\"c\",100,\"line1\nline2\"");
    }

    #[test]
    fn test_escaped_field_reads_back() {
        let txns = vec![Transaction::new("2024-03-02", "a,b\"c", -12.34, "see \"memo\", p.2")];
        let csv = to_csv(&txns).unwrap();

        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let records: Vec<csv::StringRecord> = rdr.records().collect::<Result<_, _>>().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(&records[0][1], "a,b\"c");
        assert_eq!(&records[0][2], "-12.34");
        assert_eq!(&records[0][3], "see \"memo\", p.2");
    }

    #[test]
    fn test_line_count_and_order() {
        let txns: Vec<Transaction> = (1..=5)
            .map(|i| Transaction::new(format!("2024-03-0{i}"), format!("Row {i}"), -(i as f64), ""))
            .collect();
        let csv = to_csv(&txns).unwrap();

        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), txns.len() + 1);
        assert!(lines[1].starts_with("2024-03-01,Row 1,-1,"));
        assert!(lines[5].starts_with("2024-03-05,Row 5,-5,"));
    }

    #[test]
    fn test_idempotent() {
        let txns = vec![
            Transaction::new("2024-03-01", "Coffee Shop", -4.5, ""),
            Transaction::new("2024-03-02", "Refund, partial", 12.0, "ambiguous sign"),
        ];
        assert_eq!(to_csv(&txns).unwrap(), to_csv(&txns).unwrap());
    }

    #[test]
    fn test_converted_file_name() {
        assert_eq!(converted_file_name("march.pdf"), "march_converted.csv");
        assert_eq!(converted_file_name("scan.2024.03.jpeg"), "scan.2024.03_converted.csv");
        assert_eq!(converted_file_name("statement"), "statement_converted.csv");
        assert_eq!(converted_file_name("trailing."), "trailing._converted.csv");
    }
}
