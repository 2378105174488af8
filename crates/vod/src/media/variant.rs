use serde::{Deserialize, Serialize};
use std::fmt;

/// One concrete download attempt derived from a resolved source.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct DownloadVariant {
    pub url: String,
    pub label: String,
    // appended to the file stem, before the extension
    pub file_suffix: String,
}

impl DownloadVariant {
    pub fn new(
        url: impl Into<String>,
        label: impl Into<String>,
        file_suffix: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            label: label.into(),
            file_suffix: file_suffix.into(),
        }
    }
}

impl fmt::Display for DownloadVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.label, self.url)
    }
}
