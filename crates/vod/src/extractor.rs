//! Candidate extraction from an item's `video` block.
//!
//! Every known address field is described by one [`ExtractionRule`]; rules are
//! evaluated in table order and a missing field simply yields nothing.

use serde_json::Value;
use tracing::debug;

use crate::media::{Candidate, SourceKind};
use crate::metadata::{field, url_list};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AddressField {
    Download,
    PlayH264,
    Play,
}

impl AddressField {
    fn kind(self) -> SourceKind {
        match self {
            AddressField::Download => SourceKind::DownloadAddr,
            AddressField::PlayH264 => SourceKind::PlayAddrH264,
            AddressField::Play => SourceKind::PlayAddr,
        }
    }
}

struct ExtractionRule {
    field: AddressField,
    keys: &'static [&'static str],
    priority: u32,
}

const ADDRESS_RULES: &[ExtractionRule] = &[
    ExtractionRule {
        field: AddressField::Download,
        keys: &["download_addr", "downloadAddr", "DownloadAddr"],
        priority: 1,
    },
    ExtractionRule {
        field: AddressField::PlayH264,
        keys: &["play_addr_h264", "playAddrH264", "PlayAddrH264"],
        priority: 2,
    },
    ExtractionRule {
        field: AddressField::Play,
        keys: &["play_addr", "playAddr", "PlayAddr"],
        priority: 3,
    },
];

const BITRATE_KEYS: &[&str] = &["bit_rate", "bitrateInfo", "bitRate", "BitrateInfo"];
const BITRATE_PLAY_ADDR_KEYS: &[&str] = &["play_addr", "PlayAddr", "playAddr"];
const QUALITY_TYPE_KEYS: &[&str] = &["quality_type", "QualityType", "qualityType"];
const GEAR_NAME_KEYS: &[&str] = &["gear_name", "GearName", "gearName"];

/// Priority of the first bitrate entry; each later entry adds one.
pub const BITRATE_BASE_PRIORITY: u32 = 4;

/// Enumerate every candidate URL of an item.
///
/// Returns an empty list when the item has no `video` object. Candidates come
/// out in discovery order; the selector is responsible for ranking them.
pub fn extract(metadata: &Value) -> Vec<Candidate> {
    let Some(video) = metadata.get("video").filter(|v| v.is_object()) else {
        debug!("Metadata has no video block");
        return Vec::new();
    };

    let mut candidates = Vec::new();

    for rule in ADDRESS_RULES {
        let url = field(video, rule.keys)
            .map(url_list)
            .and_then(|urls| urls.into_iter().find(|url| !url.trim().is_empty()));

        if let Some(url) = url {
            candidates.push(Candidate::new(url, rule.field.kind(), rule.priority));
        }
    }

    let entries = field(video, BITRATE_KEYS)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for (bitrate_index, entry) in entries.iter().enumerate() {
        let priority = BITRATE_BASE_PRIORITY + bitrate_index as u32;
        let quality = quality_label(entry);
        let mirrors = field(entry, BITRATE_PLAY_ADDR_KEYS)
            .map(url_list)
            .unwrap_or_default();

        for (mirror_index, url) in mirrors.into_iter().enumerate() {
            if url.trim().is_empty() {
                continue;
            }
            candidates.push(Candidate::new(
                url,
                SourceKind::BitrateVariant {
                    bitrate_index,
                    mirror_index,
                    quality: quality.clone(),
                },
                priority,
            ));
        }
    }

    debug!(count = candidates.len(), "Extracted candidates");
    candidates
}

fn quality_label(entry: &Value) -> String {
    match field(entry, QUALITY_TYPE_KEYS) {
        Some(Value::Number(n)) => return n.to_string(),
        Some(Value::String(s)) if !s.is_empty() => return s.clone(),
        _ => {}
    }

    field(entry, GEAR_NAME_KEYS)
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .unwrap_or("unknown")
        .to_string()
}
