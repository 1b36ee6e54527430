use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid media id: {0:?}")]
    InvalidMediaId(String),

    #[error("Invalid trim range: start {start} is after end {end}")]
    InvalidTrimRange { start: u32, end: u32 },
}

pub type Result<T> = std::result::Result<T, CoreError>;
