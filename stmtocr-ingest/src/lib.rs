//! stmtocr-ingest: statement files and their base64 encoding

pub mod encoder;
pub mod types;

pub use encoder::{ReadError, encode, strip_data_uri_prefix};
pub use types::{PDF_MIME, RawFile, RawSource, detect_mime, is_accepted_mime};
