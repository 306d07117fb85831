use thiserror::Error;

#[derive(Error, Debug)]
pub enum FundError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid {table}.{field} value '{value}'")]
    InvalidRecord {
        table: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Fund period '{0}' not found")]
    PeriodNotFound(String),

    #[error("Fund period '{0}' is already completed")]
    PeriodCompleted(String),

    #[error("Fund period '{period}' has {count} pending entries")]
    PendingEntries { period: String, count: i64 },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type FundResult<T> = Result<T, FundError>;
