use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("access denied: {0}")]
    AccessDenied(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("backend not available: {0}")]
    Unsupported(String),
}

impl StoreError {
    /// Map an OS error for `location`, keeping the not-found and
    /// permission cases distinguishable.
    pub fn from_io(err: std::io::Error, location: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(location.to_string()),
            std::io::ErrorKind::PermissionDenied => {
                StoreError::AccessDenied(format!("{location}: {err}"))
            }
            _ => StoreError::Io(err),
        }
    }
}
