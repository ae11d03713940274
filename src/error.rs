use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("IO operation failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, RelayError>;
