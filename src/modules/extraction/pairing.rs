use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::json_walk::{extract_field, extract_records, CveRecord};
use crate::config::bot_profile::ExtractionConfig;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PairingStrategy {
    /// Identifier and URL taken from the same CVE record.
    #[default]
    Joint,
    /// Two independent walks zipped by index. Misaligns whenever a record
    /// lacks a marker URL or carries more than one.
    Positional,
}

/// Ordered identifier -> reference URL map. Re-inserting an identifier keeps
/// its first position and replaces the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishMapping {
    entries: Vec<(String, String)>,
}

impl PublishMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: String, url: String) {
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = url,
            None => self.entries.push((id, url)),
        }
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == id).map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for PublishMapping {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut mapping = PublishMapping::new();
        for (id, url) in iter {
            mapping.insert(id, url);
        }
        mapping
    }
}

pub fn filter_marked<I>(urls: I, marker: &str) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    urls.into_iter().filter(|u| u.contains(marker)).collect()
}

/// Zips by index and truncates to the shorter list. Nothing checks that the
/// i-th URL belongs to the i-th identifier.
pub fn pair_positional(ids: Vec<String>, urls: Vec<String>) -> PublishMapping {
    if ids.len() != urls.len() {
        warn!(
            "positional pairing: {} identifiers vs {} urls, dropping {} unmatched entries",
            ids.len(),
            urls.len(),
            ids.len().abs_diff(urls.len())
        );
    }
    ids.into_iter().zip(urls).collect()
}

/// First marker URL of each record; records without one are skipped.
pub fn pair_joint(records: Vec<CveRecord>, marker: &str) -> PublishMapping {
    let mut mapping = PublishMapping::new();
    for record in records {
        match record.urls.into_iter().find(|u| u.contains(marker)) {
            Some(url) => mapping.insert(record.id, url),
            None => info!("{} has no '{}' reference; not announcing", record.id, marker),
        }
    }
    mapping
}

pub fn build_mapping(document: &Value, cfg: &ExtractionConfig) -> PublishMapping {
    match cfg.pairing {
        PairingStrategy::Joint => {
            let records = extract_records(document, &cfg.id_key, &cfg.url_key);
            pair_joint(records, &cfg.marker)
        }
        PairingStrategy::Positional => {
            let ids: Vec<String> = extract_field(document, &cfg.id_key).collect();
            let urls = filter_marked(extract_field(document, &cfg.url_key), &cfg.marker);
            pair_positional(ids, urls)
        }
    }
}
