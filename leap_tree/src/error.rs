use thiserror::Error;

use crate::source::SourceError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("window error: {0}")]
    Window(#[from] minifb::Error),

    #[error("landmark source: {0}")]
    Source(#[from] SourceError),
}
