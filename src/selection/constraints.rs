use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::types::Item;

/// Minimum number of administered items per content tag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentConstraints {
    pub min_per_tag: BTreeMap<String, usize>,
}

impl ContentConstraints {
    pub fn require(mut self, tag: impl Into<String>, minimum: usize) -> Self {
        self.min_per_tag.insert(tag.into(), minimum);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.min_per_tag.values().all(|&min| min == 0)
    }

    /// Tags whose minimum coverage is not yet met by `administered`.
    pub fn unmet_tags<'a>(&'a self, administered: &[&Item]) -> Vec<&'a str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for item in administered {
            if let Some(tag) = item.content_tag.as_deref() {
                *counts.entry(tag).or_insert(0) += 1;
            }
        }

        self.min_per_tag
            .iter()
            .filter(|(tag, min)| counts.get(tag.as_str()).copied().unwrap_or(0) < **min)
            .map(|(tag, _)| tag.as_str())
            .collect()
    }
}

/// Simple usage cap: items already shown `max_exposures` times elsewhere are
/// not offered again. Counts are supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExposureCap {
    pub max_exposures: u32,
    pub counts: HashMap<String, u32>,
}

impl ExposureCap {
    pub fn new(max_exposures: u32) -> Self {
        Self {
            max_exposures,
            counts: HashMap::new(),
        }
    }

    pub fn with_count(mut self, item_id: impl Into<String>, count: u32) -> Self {
        self.counts.insert(item_id.into(), count);
        self
    }

    pub fn allows(&self, item: &Item) -> bool {
        self.counts.get(&item.id).copied().unwrap_or(0) < self.max_exposures
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionConstraints {
    #[serde(default)]
    pub content: ContentConstraints,
    #[serde(default)]
    pub exposure: Option<ExposureCap>,
}
