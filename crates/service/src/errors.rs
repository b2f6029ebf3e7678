use thiserror::Error;

/// Infrastructure failures below the issue domain.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("corrupt data under `{key}`: {reason}")]
    Corrupt { key: String, reason: String },
}

impl ServiceError {
    pub fn storage(err: impl std::fmt::Display) -> Self { Self::Storage(err.to_string()) }

    pub fn corrupt(key: &str, err: impl std::fmt::Display) -> Self {
        Self::Corrupt { key: key.to_string(), reason: err.to_string() }
    }
}
