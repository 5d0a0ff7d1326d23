//! Header representations
//!
//! HTTP header names are case-insensitive, but some callers need the headers
//! exactly as they came off the wire. `HeaderPairs` keeps the raw sequence
//! (casing and duplicates intact) and derives the other views from it.

use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered sequence of `(name, value)` pairs as received
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPairs(Vec<(String, String)>);

impl HeaderPairs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a flat `[name, value, name, value, ...]` list.
    ///
    /// A trailing name without a value is kept with an empty value.
    pub fn from_flat<S: AsRef<str>>(flat: &[S]) -> Self {
        let pairs = flat
            .chunks(2)
            .map(|chunk| {
                let name = chunk[0].as_ref().to_string();
                let value = chunk
                    .get(1)
                    .map(|v| v.as_ref().to_string())
                    .unwrap_or_default();
                (name, value)
            })
            .collect();
        Self(pairs)
    }

    /// Build from a `reqwest` header map, one pair per value.
    pub fn from_header_map(headers: &HeaderMap) -> Self {
        let pairs = headers
            .iter()
            .map(|(name, value)| {
                let value = match value.to_str() {
                    Ok(v) => v.to_string(),
                    Err(_) => String::from_utf8_lossy(value.as_bytes()).into_owned(),
                };
                (name.as_str().to_string(), value)
            })
            .collect();
        Self(pairs)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Case-folded view: lower-cased names, duplicate values joined with `", "`.
    pub fn folded(&self) -> BTreeMap<String, String> {
        let mut folded: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in &self.0 {
            folded
                .entry(name.to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.clone());
        }
        folded
    }

    /// Case-preserving view. The last value wins for a repeated name.
    pub fn case_preserving(&self) -> BTreeMap<String, String> {
        self.0.iter().cloned().collect()
    }

    /// `Name: value` lines joined by `\n`, in arrival order.
    pub fn to_raw_string(&self) -> String {
        self.0
            .iter()
            .map(|(name, value)| format!("{}: {}", name, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for HeaderPairs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
