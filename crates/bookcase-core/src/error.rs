use thiserror::Error;

/// All errors that can occur in bookcase-core.
#[derive(Debug, Error)]
pub enum BookcaseError {
    #[error("invalid record: missing identity fields (title: {title:?}, author: {author:?})")]
    InvalidRecord { title: String, author: String },

    #[error("invalid ISBN: {0}")]
    InvalidIsbn(String),

    #[error("invalid rating {0}: expected 1 to 5 stars")]
    InvalidRating(u8),

    #[error("invalid shelf status: {0}")]
    InvalidStatus(String),

    #[error("unknown tie-break criterion: {0}")]
    UnknownTieBreak(String),

    #[error("unknown export format: {0}")]
    UnknownExportFormat(String),

    #[error("export error: {0}")]
    Export(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, BookcaseError>;
