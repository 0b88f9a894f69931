use thiserror::Error;

/// Failures surfaced by the transport layer.
///
/// Kept `Clone` so results can travel inside iced messages. Nothing here is
/// retried or classified further; callers decide what to show.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    /// Raw response body for status errors, empty otherwise
    pub fn body(&self) -> &str {
        match self {
            ApiError::Status { body, .. } => body,
            _ => "",
        }
    }

    /// True when the backend reported that the submitted image had no face
    pub fn is_no_face_detected(&self) -> bool {
        self.body().contains("No face detected")
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// One file of an upload run that did not make it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UploadError {
    #[error("could not read file: {0}")]
    Read(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Input rejected before any network call is made
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("selected file is not an image")]
    NotAnImage,

    #[error("selected file is {size} bytes, limit is {limit}")]
    TooLarge { size: u64, limit: u64 },

    #[error("search query is empty")]
    EmptyQuery,

    #[error("no file selected")]
    NoFileSelected,

    #[error("no event selected")]
    NoEventSelected,

    #[error("nothing to upload")]
    NothingToUpload,

    #[error("a request is already in flight")]
    Busy,
}

/// Durable key-value storage failures
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("stored value is not valid JSON: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("could not prepare storage directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not determine user data directory")]
    NoDataDir,

    #[error("storage lock poisoned")]
    Poisoned,
}

/// Anything that stops the application from starting
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("session storage unavailable: {0}")]
    Storage(#[from] StorageError),

    #[error("HTTP client unavailable: {0}")]
    Http(#[from] ApiError),
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}
