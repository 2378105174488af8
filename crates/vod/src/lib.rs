//! # vod-engine
//!
//! Resolves a playable source from short-video item metadata and downloads it
//! as a set of redundant variants.
//!
//! ## Features
//!
//! - Candidate extraction from app, web and nested metadata shapes
//! - Priority-ordered probing with a play address fallback
//! - Watermark and logo free URL rewrites
//! - Isolated, size-validated variant downloads
//!
//! ```no_run
//! # async fn run(metadata: serde_json::Value) -> Result<(), vod_engine::AcquireError> {
//! use vod_engine::{AcquireConfig, Acquirer};
//!
//! let acquirer = Acquirer::new(AcquireConfig::default())?;
//! let artifacts = acquirer
//!     .acquire(&metadata, "ttwid=...", std::path::Path::new("downloads"), None)
//!     .await?;
//! for artifact in artifacts {
//!     println!("{} -> {}", artifact.variant.label, artifact.path.display());
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod client;
pub mod config;
pub mod downloader;
pub mod error;
pub mod extractor;
pub mod media;
pub mod metadata;
pub mod pipeline;
pub mod planner;
pub mod probe;
pub mod selector;
pub mod session;

#[cfg(test)]
mod test_utils;

pub use builder::AcquireConfigBuilder;
pub use client::create_client;
pub use config::{AcquireConfig, MIN_VALID_BYTES, ProbeMode};
pub use downloader::RedundantDownloader;
pub use error::{AcquireError, DownloadError};
pub use extractor::extract;
pub use media::{
    Candidate, DownloadOutcome, DownloadVariant, DownloadedArtifact, ResolvedSource, SourceKind,
    VariantFailure,
};
pub use metadata::{item_id, item_id_from_url, locate_item, normalize_url};
pub use pipeline::Acquirer;
pub use planner::plan;
pub use probe::{AccessibilityProbe, HttpProber};
pub use selector::select;
pub use session::{Session, SessionBuilder};
