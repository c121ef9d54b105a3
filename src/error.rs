use thiserror::Error;

/// Rejected user input. The tracker state is never touched when one of these is returned.
#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("expense name is empty")]
    EmptyName,
    #[error("amount is not a number: {0:?}")]
    InvalidAmount(String),
    #[error("amount must be non-negative and finite, got {0}")]
    NegativeAmount(f64),
    #[error("budget must be non-negative and finite, got {0:?}")]
    InvalidBudget(String),
    #[error("adding {0} would push total spending past the largest representable amount")]
    TotalOverflow(f64),
}

/// Failure inside a key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid key {0:?}")]
    InvalidKey(String),
}
