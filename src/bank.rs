use std::path::Path;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::config::validate_items;
use crate::error::BankError;
use crate::types::Item;

const SYNTHETIC_TAGS: [&str; 4] = ["vocabulary", "grammar", "reading", "listening"];

/// Parses a JSON array of calibrated items and checks calibration invariants.
pub fn parse_items(json: &str) -> Result<Vec<Item>, BankError> {
    let items: Vec<Item> = serde_json::from_str(json)?;
    if items.is_empty() {
        return Err(BankError::Empty);
    }
    validate_items(&items)?;
    Ok(items)
}

pub fn load_items(path: impl AsRef<Path>) -> Result<Vec<Item>, BankError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|source| BankError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let items = parse_items(&raw)?;
    tracing::info!(path = %path.display(), items = items.len(), "item bank loaded");
    Ok(items)
}

/// Deterministic pool with a in [0.6, 2.2], b in [-3, 3] and rotating tags.
pub fn synthetic_bank(size: usize, seed: u64) -> Vec<Item> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..size)
        .map(|i| {
            let discrimination = 0.6 + 1.6 * rng.gen::<f64>();
            let difficulty = -3.0 + 6.0 * rng.gen::<f64>();
            Item::new(format!("item-{i:04}"), discrimination, difficulty)
                .with_tag(SYNTHETIC_TAGS[i % SYNTHETIC_TAGS.len()])
        })
        .collect()
}
