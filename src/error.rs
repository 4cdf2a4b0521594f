use std::io;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Identity provider rejected us or the consent flow failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Gmail API request failed ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Invalid base64 in message body: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Message body is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Export directory already exists: {}", .0.display())]
    DirectoryExists(PathBuf),

    #[error("Failed to create export directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }
}
