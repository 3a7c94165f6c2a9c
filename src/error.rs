use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClaimsError {
    #[error("Missing input {path}: {reason}")]
    MissingInput { path: String, reason: String },

    #[error("Schema error in {source_name}: missing column '{column}'")]
    Schema { source_name: String, column: String },

    #[error("Parse error in {source_name} at line {line}: {reason}")]
    Parse {
        source_name: String,
        line: usize,
        reason: String,
    },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Duplicate address: {0}")]
    DuplicateAddress(String),

    #[error("Invalid amount for account: {0}")]
    InvalidAmount(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ClaimsError>;
