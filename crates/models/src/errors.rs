use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("decode error: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("encode error: {0}")]
    Encode(#[source] serde_json::Error),
}
