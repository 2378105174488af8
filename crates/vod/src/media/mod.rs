pub mod candidate;
pub mod outcome;
pub mod variant;

pub use candidate::{Candidate, ResolvedSource, SourceKind};
pub use outcome::{DownloadOutcome, DownloadedArtifact, VariantFailure};
pub use variant::DownloadVariant;
