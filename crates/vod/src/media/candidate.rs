use serde::{Deserialize, Serialize};
use std::fmt;

use crate::metadata::normalize_url;

/// Where in the item metadata a candidate URL was found.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Explicit no-watermark download address
    DownloadAddr,
    /// High quality H264 play address
    PlayAddrH264,
    /// Standard play address, the selection fallback
    PlayAddr,
    /// One mirror of one bitrate entry
    BitrateVariant {
        bitrate_index: usize,
        mirror_index: usize,
        quality: String,
    },
}

impl SourceKind {
    pub fn as_str(&self) -> &str {
        match self {
            SourceKind::DownloadAddr => "download_addr",
            SourceKind::PlayAddrH264 => "play_addr_h264",
            SourceKind::PlayAddr => "play_addr",
            SourceKind::BitrateVariant { .. } => "bitrate_variant",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::BitrateVariant {
                bitrate_index,
                mirror_index,
                quality,
            } => write!(
                f,
                "{} [{}:{}] ({})",
                self.as_str(),
                bitrate_index,
                mirror_index,
                quality
            ),
            _ => f.write_str(self.as_str()),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub kind: SourceKind,
    // lower is preferred
    pub priority: u32,
}

impl Candidate {
    pub fn new(url: impl Into<String>, kind: SourceKind, priority: u32) -> Self {
        Self {
            url: url.into(),
            kind,
            priority,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {} - {}", self.priority, self.kind, self.url)
    }
}

/// The candidate chosen by the selector. Its URL is always normalized.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSource {
    url: String,
    kind: SourceKind,
    priority: u32,
}

impl ResolvedSource {
    pub fn new(url: &str, kind: SourceKind, priority: u32) -> Self {
        Self {
            url: normalize_url(url).into_owned(),
            kind,
            priority,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> &SourceKind {
        &self.kind
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }
}

impl From<Candidate> for ResolvedSource {
    fn from(candidate: Candidate) -> Self {
        Self::new(&candidate.url, candidate.kind, candidate.priority)
    }
}

impl fmt::Display for ResolvedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.kind, self.url)
    }
}
