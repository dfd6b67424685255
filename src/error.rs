use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("data source used before init() completed")]
    Uninitialized,

    #[error("failed to open backend: {0}")]
    Connection(String),

    #[error("backend query failed: {message}")]
    Backend { message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;
