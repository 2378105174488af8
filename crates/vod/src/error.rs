use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::media::VariantFailure;

/// Errors that abort an acquisition as a whole.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("metadata does not contain video data")]
    NoVideoData,

    #[error("no candidate sources found")]
    NoSourcesFound,

    #[error("no accessible source and no play address to fall back to")]
    NoAccessibleSource,

    #[error("all {} download variants failed", .0.len())]
    AllDownloadsFailed(Vec<VariantFailure>),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("TLS configuration error: {0}")]
    TlsError(#[from] rustls::Error),
}

// Failure of a single download variant. Recorded, never propagated on its own.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    UrlError(String),

    #[error("Server returned status code {0}")]
    StatusCode(StatusCode),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Redirect response without a Location header")]
    MissingLocation,

    #[error("Redirect limit of {0} exceeded")]
    TooManyRedirects(usize),

    #[error("Artifact too small: {size} bytes (must exceed {min})")]
    ArtifactTooSmall { size: u64, min: u64 },

    #[error("Download timed out after {0:?}")]
    Timeout(Duration),
}
