//! Error types shared across the Vizion crates.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum VizionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("No Gemini API key configured (set it in settings.json or GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("Image analysis unavailable: {0}")]
    Unavailable(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("gemini error: {status}\n{body}")]
    Status { status: u16, body: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Speech error: {0}")]
    Speech(String),
}

pub type Result<T> = std::result::Result<T, VizionError>;
