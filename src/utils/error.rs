use thiserror::Error;

#[derive(Debug, Error)]
pub enum DocumentError {
    /// Carries the parser message verbatim so callers can prefix it.
    #[error("{0}")]
    MrzParsing(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
