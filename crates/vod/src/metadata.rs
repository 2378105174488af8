//! Helpers for navigating loosely structured item metadata.
//!
//! Page metadata comes in a handful of shapes: snake_case app payloads,
//! camelCase web payloads and PascalCase nested structs. Lookups here accept
//! every known alias so the extractor can stay declarative.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::AcquireError;

// JSON pointers of the objects that may hold the item, tried in order.
const ITEM_POINTERS: &[&str] = &[
    "",
    "/aweme_detail",
    "/itemInfo/itemStruct",
    "/itemStruct",
    "/aweme_list/0",
    "/item_list/0",
];

const ITEM_ID_KEYS: &[&str] = &["aweme_id", "awemeId", "id"];

pub(crate) const URL_LIST_KEYS: &[&str] = &["url_list", "urlList", "UrlList"];

pub static ITEM_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:/video/|/note/|[?&]modal_id=)(\d+)").unwrap());

/// Find the item object that carries a `video` block.
pub fn locate_item(root: &Value) -> Result<&Value, AcquireError> {
    ITEM_POINTERS
        .iter()
        .filter_map(|pointer| root.pointer(pointer))
        .find(|item| item.get("video").is_some_and(Value::is_object))
        .ok_or(AcquireError::NoVideoData)
}

/// Read the item id from its metadata, accepting string or numeric ids.
pub fn item_id(item: &Value) -> Option<String> {
    ITEM_ID_KEYS
        .iter()
        .filter_map(|key| item.get(key))
        .find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

/// Extract the numeric item id from a share or page URL.
pub fn item_id_from_url(url: &str) -> Option<String> {
    ITEM_ID_REGEX
        .captures(url)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
}

/// Unescape ampersands that the page JSON embeds as `\u0026` or `&amp;`.
pub fn normalize_url(url: &str) -> Cow<'_, str> {
    let url = url.trim();
    if !url.contains("\\u0026") && !url.contains("\\U0026") && !url.contains("&amp;") {
        return Cow::Borrowed(url);
    }

    Cow::Owned(
        url.replace("\\u0026", "&")
            .replace("\\U0026", "&")
            .replace("&amp;", "&"),
    )
}

/// First field of `object` present under any of `keys`.
pub(crate) fn field<'a>(object: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| object.get(key))
        .find(|value| !value.is_null())
}

/// URLs held by an address value: a bare string, an array of strings,
/// or an object wrapping a url list.
pub(crate) fn url_list(value: &Value) -> Vec<&str> {
    match value {
        Value::String(s) => vec![s.as_str()],
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        Value::Object(_) => field(value, URL_LIST_KEYS)
            .map(url_list)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}
