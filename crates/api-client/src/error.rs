use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Request to external source failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("External source returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Failed to deserialize the source response: {0}")]
    Deserialization(String),
}
