//! Fixed instruction text and response schema sent with every statement.

use serde_json::{Value, json};

pub const EXTRACTION_PROMPT: &str = "\
Analyze this bank statement image or PDF document.
Your task is to detect and extract every valid transaction row from the statement.

Rules:
1. Extract the 'transaction_date' and normalize it to YYYY-MM-DD.
2. Extract the 'transaction_title_or_description'.
3. Extract the 'amount'. Ensure debits (outflows) are negative numbers and credits (inflows) are positive numbers.
4. Add any extra context found (like categories, check numbers) to 'notes'.
5. Ignore headers, footers, page numbers, running balances, and advertisements.
6. If a line is ambiguous, make a best guess and add a note about the ambiguity.
7. If no transactions are found, return an empty array.
";

/// Array of transaction objects; `notes` is requested but not required.
pub fn response_schema() -> Value {
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "transaction_date": {
                    "type": "STRING",
                    "description": "The date of the transaction in YYYY-MM-DD format."
                },
                "transaction_title_or_description": {
                    "type": "STRING",
                    "description": "The description or title of the transaction."
                },
                "amount": {
                    "type": "NUMBER",
                    "description": "The transaction amount. Use negative values for debits/withdrawals and positive values for credits/deposits."
                },
                "notes": {
                    "type": "STRING",
                    "description": "Any additional notes, categories, reference numbers, or comments about ambiguity."
                }
            },
            "required": ["transaction_date", "transaction_title_or_description", "amount"]
        }
    })
}
