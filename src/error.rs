//! Error types for catalog search and downloads.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for all ytm-dl operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The catalog answered with an error payload.
    #[error("API error: {0}")]
    ApiError(String),

    /// The catalog answered, but not in a shape we understand.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// HTTP request failed.
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// yt-dlp could not be located and was not installed.
    #[error("yt-dlp not found: {0}")]
    ToolNotFound(String),

    /// Downloading the yt-dlp release failed.
    #[error("Failed to install yt-dlp to {path}: {reason}")]
    InstallFailed {
        /// Where the binary was going to be placed.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// yt-dlp ran but reported a failure.
    #[error("yt-dlp failed for {url} ({status}): {stderr}")]
    FetchFailed {
        /// URL handed to yt-dlp.
        url: String,
        /// Exit status description.
        status: String,
        /// Last lines of yt-dlp's stderr.
        stderr: String,
    },
}

/// Result type alias for ytm-dl operations.
pub type Result<T> = std::result::Result<T, Error>;
