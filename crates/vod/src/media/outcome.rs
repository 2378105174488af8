use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::variant::DownloadVariant;
use crate::error::DownloadError;

/// A validated artifact on disk. The caller owns the file.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DownloadedArtifact {
    pub variant: DownloadVariant,
    pub path: PathBuf,
    pub size: u64,
}

/// A variant that produced no usable artifact.
#[derive(Debug)]
pub struct VariantFailure {
    pub variant: DownloadVariant,
    pub reason: DownloadError,
}

impl fmt::Display for VariantFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.variant.label, self.reason)
    }
}

pub type DownloadOutcome = Result<DownloadedArtifact, VariantFailure>;
