//! Link lists from a listing-page extraction.

use std::collections::HashSet;

use serde_json::Value;
use tracing::debug;
use url::Url;

use super::coerce;
use crate::types::{LinkDescriptor, StructuredRecord};

/// Keys the service has been seen to put the link list under, in lookup order.
const CONTAINER_KEYS: &[&str] = &["links", "items", "results", "jobs", "sessions", "data"];

const NAME: &[&str] = &["name", "title", "text", "label"];
const URL: &[&str] = &["url", "href", "link"];
const HINT: &[&str] = &["category", "hint", "context", "section"];

/// Pull the link list out of a listing record.
///
/// Relative URLs are resolved against `listing_url`. Entries without a usable
/// http(s) URL are skipped, and a repeated URL keeps its first occurrence.
pub fn extract_links(record: &StructuredRecord, listing_url: &Url) -> Vec<LinkDescriptor> {
    let Some(items) = find_items(record.value()) else {
        debug!(listing = %listing_url, "No link list in listing record");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    let mut skipped = 0usize;

    for item in items {
        match link_from_item(item, listing_url) {
            Some(link) if seen.insert(link.url.clone()) => links.push(link),
            Some(_) => {}
            None => skipped += 1,
        }
    }

    debug!(
        listing = %listing_url,
        found = links.len(),
        skipped,
        "Extracted links"
    );
    links
}

fn find_items(value: &Value) -> Option<&Vec<Value>> {
    if let Value::Array(items) = value {
        return Some(items);
    }

    let map = value.as_object()?;
    CONTAINER_KEYS.iter().find_map(|key| match map.get(*key)? {
        Value::Array(items) => Some(items),
        // one level of nesting, e.g. {"data": {"links": [...]}}
        Value::Object(inner) => CONTAINER_KEYS
            .iter()
            .find_map(|key| inner.get(*key).and_then(Value::as_array)),
        _ => None,
    })
}

fn link_from_item(item: &Value, listing_url: &Url) -> Option<LinkDescriptor> {
    let (raw_url, name, hint) = match item {
        Value::String(s) => (s.trim().to_string(), None, None),
        Value::Object(map) => {
            let pick = |keys: &[&str]| {
                keys.iter()
                    .filter_map(|key| map.get(*key))
                    .find_map(coerce::text)
            };
            (pick(URL)?, pick(NAME), pick(HINT))
        }
        _ => return None,
    };

    let url = resolve(&raw_url, listing_url)?;
    let mut link = LinkDescriptor::new(name.unwrap_or_else(|| url.clone()), url);
    if let Some(hint) = hint {
        link = link.with_hint(hint);
    }
    Some(link)
}

fn resolve(raw: &str, base: &Url) -> Option<String> {
    if raw.is_empty() {
        return None;
    }
    let url = base.join(raw).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}
