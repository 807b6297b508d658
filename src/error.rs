use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum HuntError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error at {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {} is not a listing array: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl HuntError {
    pub fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        HuntError::Storage {
            path: path.into(),
            source,
        }
    }

    // Errors the interactive loop reports and moves past.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HuntError::Transport(_) | HuntError::Validation(_) | HuntError::NotFound(_)
        )
    }
}

impl From<reqwest::Error> for HuntError {
    fn from(e: reqwest::Error) -> Self {
        HuntError::Transport(e.to_string())
    }
}

pub type HuntResult<T> = Result<T, HuntError>;
