//! Candidate selection: rank, probe in order, fall back to the play address.

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::media::{Candidate, ResolvedSource, SourceKind};
use crate::metadata::normalize_url;
use crate::probe::AccessibilityProbe;
use crate::{AcquireError, ProbeMode};

/// Pick the first accessible candidate in priority order.
///
/// Candidates are stably sorted by priority, so ties keep discovery order.
/// When no probe succeeds the [`SourceKind::PlayAddr`] candidate is returned
/// anyway: probes are advisory and some CDNs reject range requests while still
/// serving full downloads.
pub async fn select<P>(
    candidates: Vec<Candidate>,
    prober: &P,
    mode: ProbeMode,
) -> Result<ResolvedSource, AcquireError>
where
    P: AccessibilityProbe + ?Sized,
{
    if candidates.is_empty() {
        return Err(AcquireError::NoSourcesFound);
    }

    let mut ordered: Vec<Candidate> = candidates
        .into_iter()
        .map(|mut candidate| {
            candidate.url = normalize_url(&candidate.url).into_owned();
            candidate
        })
        .collect();
    ordered.sort_by_key(|candidate| candidate.priority);

    let accepted = match mode {
        ProbeMode::Sequential => first_accessible_sequential(&ordered, prober).await,
        ProbeMode::Concurrent => first_accessible_concurrent(&ordered, prober).await,
    };

    if let Some(index) = accepted {
        let candidate = ordered.swap_remove(index);
        info!(source = %candidate, "Selected accessible source");
        return Ok(ResolvedSource::from(candidate));
    }

    match ordered
        .into_iter()
        .find(|candidate| candidate.kind == SourceKind::PlayAddr)
    {
        Some(candidate) => {
            warn!(source = %candidate, "No candidate passed its probe, falling back to play address");
            Ok(ResolvedSource::from(candidate))
        }
        None => Err(AcquireError::NoAccessibleSource),
    }
}

async fn first_accessible_sequential<P>(ordered: &[Candidate], prober: &P) -> Option<usize>
where
    P: AccessibilityProbe + ?Sized,
{
    for (index, candidate) in ordered.iter().enumerate() {
        debug!(candidate = %candidate, "Probing candidate");
        if prober.probe(&candidate.url).await {
            return Some(index);
        }
    }
    None
}

async fn first_accessible_concurrent<P>(ordered: &[Candidate], prober: &P) -> Option<usize>
where
    P: AccessibilityProbe + ?Sized,
{
    debug!(count = ordered.len(), "Probing candidates concurrently");
    let verdicts = join_all(ordered.iter().map(|candidate| prober.probe(&candidate.url))).await;
    verdicts.into_iter().position(|accessible| accessible)
}
