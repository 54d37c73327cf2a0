use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode notebooks: {0}")]
    Json(#[from] serde_json::Error),
    #[error("cannot determine a data directory for the notebook store")]
    NoDataDir,
}

#[derive(Debug, Error)]
pub enum PolishError {
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("polish request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("polish service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("could not read polish response: {0}")]
    Parse(String),
    #[error("polish service returned no text")]
    EmptyResponse,
    #[error("polish worker is not running")]
    WorkerGone,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("could not read image file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not decode image: {0}")]
    Decode(String),
    #[error("unsupported image format")]
    Unsupported,
    #[error("not an image data URI")]
    NotDataUri,
    #[error("clipboard: {0}")]
    Clipboard(String),
}

impl From<image::ImageError> for MediaError {
    fn from(value: image::ImageError) -> Self {
        Self::Decode(value.to_string())
    }
}

impl From<base64::DecodeError> for MediaError {
    fn from(value: base64::DecodeError) -> Self {
        Self::Decode(value.to_string())
    }
}
