use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Render error: {0}")]
    Render(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ScribeError>;
