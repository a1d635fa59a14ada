use thiserror::Error;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("Not in a promptvault directory. Run 'promptvault init' first.")]
    NotInitialized,

    #[error("Already initialized. Remove .promptvault/ to reinitialize.")]
    AlreadyInitialized,

    #[error("Prompt not found: {0}")]
    PromptNotFound(String),

    #[error("Ambiguous id '{0}' matches more than one prompt")]
    AmbiguousId(String),

    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Category already exists: {0}")]
    DuplicateCategory(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Import failed with {0} error(s)")]
    ImportFailed(usize),

    #[error("Timestamp out of range: {0}")]
    InvalidTimestamp(i64),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, VaultError>;
