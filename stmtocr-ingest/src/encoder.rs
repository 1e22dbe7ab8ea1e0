//! Raw file -> base64 payload (no data-URI prefix)

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use thiserror::Error;
use tracing::debug;

use crate::types::{RawFile, RawSource};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to read {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {0} as base64 string")]
    NotBase64(String),

    #[error("unsupported file type: {0} (expected an image or PDF)")]
    Unsupported(String),
}

/// Encode a file's contents as plain base64.
pub async fn encode(file: &RawFile) -> Result<String, ReadError> {
    let encoded = match &file.source {
        RawSource::Path(path) => {
            let bytes = tokio::fs::read(path).await.map_err(|source| ReadError::Io {
                name: file.name.clone(),
                source,
            })?;
            STANDARD.encode(bytes)
        }
        RawSource::Bytes(bytes) => STANDARD.encode(bytes),
        RawSource::DataUrl(url) => strip_data_uri_prefix(url)
            .ok_or_else(|| ReadError::NotBase64(file.name.clone()))?
            .to_string(),
    };

    debug!(file = %file.name, len = encoded.len(), "encoded file");
    Ok(encoded)
}

/// `data:image/jpeg;base64,AAAA` -> `AAAA`. `None` if there is no payload separator.
pub fn strip_data_uri_prefix(url: &str) -> Option<&str> {
    url.split_once(',').map(|(_, payload)| payload)
}
