//! stmtocr-extract: extraction client, per-file pipelines, session tracker and CSV export

pub mod error;
pub mod export;
pub mod gemini;
pub mod pipeline;
pub mod prompt;

pub use error::PipelineError;
pub use export::{CSV_HEADER, CSV_MIME, ExportError, converted_file_name, to_csv};
pub use gemini::{ExtractionConfig, Extractor, GeminiExtractor, parse_transactions};
pub use pipeline::{Tracker, process_file};
pub use prompt::{EXTRACTION_PROMPT, response_schema};
