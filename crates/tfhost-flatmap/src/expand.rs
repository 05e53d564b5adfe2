//! Flat attribute map expansion

use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use tracing::{trace, warn};

use crate::value::Expanded;

/// Flat attribute map as stored in a resource's `primary.attributes`
pub type FlatMap = BTreeMap<String, String>;

/// Sentinel segment holding a list's element count
const LIST_COUNT: &str = "#";
/// Sentinel segment holding a map's entry count
const MAP_COUNT: &str = "%";

/// Rebuild the nested value stored under `key`
///
/// Resolution order, first match wins:
/// 1. `key` itself is present: a scalar (`"true"`/`"false"` become booleans)
/// 2. `key.#` is present: a list of every numeric index found under `key.`,
///    in ascending order
/// 3. any key starts with `key.`: a map of every distinct sub-key, minus `%`
/// 4. otherwise `None`
///
/// The declared count in `key.#` is not trusted; the list holds exactly the
/// indices that are actually present.
#[must_use]
pub fn expand(flat: &FlatMap, key: &str) -> Option<Expanded> {
    if let Some(raw) = flat.get(key) {
        return Some(Expanded::scalar(raw));
    }

    if flat.contains_key(&format!("{key}.{LIST_COUNT}")) {
        return Some(expand_list(flat, key));
    }

    let prefix = format!("{key}.");
    if child_segments(flat, &prefix).next().is_some() {
        return Some(expand_map(flat, key, &prefix));
    }

    None
}

/// Expand every distinct top-level key of `flat`
///
/// Each top-level key is expanded once, regardless of how many flat keys
/// share it.
#[must_use]
pub fn expand_all(flat: &FlatMap) -> BTreeMap<String, Expanded> {
    top_level_keys(flat)
        .into_iter()
        .filter_map(|key| expand(flat, key).map(|value| (key.to_string(), value)))
        .collect()
}

/// Distinct first path segments of all keys in `flat`
#[must_use]
pub fn top_level_keys(flat: &FlatMap) -> BTreeSet<&str> {
    flat.keys().map(|k| first_segment(k)).collect()
}

fn expand_list(flat: &FlatMap, key: &str) -> Expanded {
    let prefix = format!("{key}.");

    // numeric index to the segment text it was found under, e.g. `01` for 1
    let mut indices = BTreeMap::new();
    for segment in child_segments(flat, &prefix) {
        if segment == LIST_COUNT {
            continue;
        }
        match segment.parse::<i64>() {
            Ok(index) => {
                indices.entry(index).or_insert(segment);
            }
            Err(_) => warn!(key, segment, "ignoring non-numeric list index"),
        }
    }

    if let Some(declared) = flat.get(&format!("{key}.{LIST_COUNT}"))
        && declared.parse::<usize>().ok() != Some(indices.len())
    {
        trace!(key, declared = %declared, found = indices.len(), "list count mismatch");
    }

    Expanded::List(
        indices
            .into_values()
            .filter_map(|segment| expand(flat, &format!("{key}.{segment}")))
            .collect(),
    )
}

fn expand_map(flat: &FlatMap, key: &str, prefix: &str) -> Expanded {
    let mut map = BTreeMap::new();

    for segment in child_segments(flat, prefix) {
        if segment == MAP_COUNT || map.contains_key(segment) {
            continue;
        }
        if let Some(value) = expand(flat, &format!("{key}.{segment}")) {
            map.insert(segment.to_string(), value);
        }
    }

    Expanded::Map(map)
}

/// First path segment after `prefix` for every key under it
///
/// Segments are not deduplicated: `a.0`, `a.0-x`, `a.0.b` yields `0`, `0-x`, `0`.
fn child_segments<'a>(flat: &'a FlatMap, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    flat.range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
        .map(|(k, _)| k.as_str())
        .take_while(move |k| k.starts_with(prefix))
        .map(move |k| first_segment(&k[prefix.len()..]))
}

fn first_segment(key: &str) -> &str {
    key.find('.').map_or(key, |idx| &key[..idx])
}
