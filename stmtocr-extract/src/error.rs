use stmtocr_ingest::ReadError;
use thiserror::Error;

/// Everything that can end a file's pipeline in `error`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Extraction(String),
}

impl PipelineError {
    pub fn missing_api_key() -> Self {
        PipelineError::Config(
            "API key is missing. Set GEMINI_API_KEY (or llm.api_key in config.toml).".to_string(),
        )
    }
}
