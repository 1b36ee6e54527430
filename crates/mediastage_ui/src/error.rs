use thiserror::Error;

#[derive(Debug, Error)]
pub enum UiError {
    #[error("media engine failed to initialize: {0}")]
    EngineInit(String),

    #[error("element not found: #{0}")]
    MissingElement(String),

    #[error("DOM error: {0}")]
    Dom(String),

    #[error("slider already built on #{0}")]
    SliderAlreadyBuilt(String),

    #[error("catalog unavailable: {0}")]
    Catalog(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] mediastage_core::error::CoreError),
}

pub type Result<T> = std::result::Result<T, UiError>;
