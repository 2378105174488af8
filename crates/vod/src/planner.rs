//! Derives the fixed set of download attempts for a resolved source.
//!
//! Query markers are matched and rewritten as whole `&`-separated pairs, so
//! `watermark=1` never matches `watermark=10`. Everything else in the URL is
//! kept byte for byte, which matters for signed CDN links.

use tracing::debug;

use crate::media::{DownloadVariant, ResolvedSource};
use crate::metadata::normalize_url;

const WATERMARK_ON: &str = "watermark=1";
const WATERMARK_OFF: &str = "watermark=0";
const LOGO_ON: &str = "logo=1";
const LOGO_OFF: &str = "logo=0";

pub const ORIGINAL_LABEL: &str = "original";
pub const NO_WATERMARK_LABEL: &str = "no-watermark";
pub const CLEAN_LABEL: &str = "no-watermark-no-logo";

/// Plan the download variants for `source`.
///
/// Always yields the original URL and a watermark-disabled rewrite (possibly
/// identical to the original). A third variant that also disables the logo
/// is only added when the original URL carries the watermark marker.
pub fn plan(source: &ResolvedSource) -> Vec<DownloadVariant> {
    let original = normalize_url(source.url()).into_owned();
    let no_watermark = rewrite_query_pair(&original, WATERMARK_ON, WATERMARK_OFF);
    let has_marker = has_query_pair(&original, WATERMARK_ON);

    let mut variants = Vec::with_capacity(3);
    if has_marker {
        let clean = rewrite_query_pair(&no_watermark, LOGO_ON, LOGO_OFF);
        variants.push(DownloadVariant::new(original, ORIGINAL_LABEL, ""));
        variants.push(DownloadVariant::new(no_watermark, NO_WATERMARK_LABEL, "_nowm"));
        variants.push(DownloadVariant::new(clean, CLEAN_LABEL, "_clean"));
    } else {
        variants.push(DownloadVariant::new(original, ORIGINAL_LABEL, ""));
        variants.push(DownloadVariant::new(no_watermark, NO_WATERMARK_LABEL, "_nowm"));
    }

    debug!(count = variants.len(), has_marker, "Planned download variants");
    variants
}

/// Split `url` into (before `?`, query, `#fragment` or empty).
fn split_query(url: &str) -> Option<(&str, &str, &str)> {
    let (head, fragment) = match url.find('#') {
        Some(pos) => url.split_at(pos),
        None => (url, ""),
    };
    let (path, query) = head.split_once('?')?;
    Some((path, query, fragment))
}

fn has_query_pair(url: &str, pair: &str) -> bool {
    split_query(url)
        .map(|(_, query, _)| query.split('&').any(|p| p == pair))
        .unwrap_or(false)
}

fn rewrite_query_pair(url: &str, from: &str, to: &str) -> String {
    let Some((path, query, fragment)) = split_query(url) else {
        return url.to_string();
    };

    let query = query
        .split('&')
        .map(|p| if p == from { to } else { p })
        .collect::<Vec<_>>()
        .join("&");

    format!("{path}?{query}{fragment}")
}
