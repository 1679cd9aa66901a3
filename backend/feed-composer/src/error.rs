use thiserror::Error;

/// Errors raised at the edges of the composer (selector parsing, config).
///
/// The pipeline itself never fails: malformed records are normalised by the
/// accessor layer instead of being rejected.
#[derive(Debug, Error)]
pub enum ComposerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid sort strategy: {0}")]
    InvalidSortStrategy(String),

    #[error("Invalid category: {0}")]
    InvalidCategory(String),
}

impl From<envy::Error> for ComposerError {
    fn from(err: envy::Error) -> Self {
        ComposerError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ComposerError>;
