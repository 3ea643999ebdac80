use std::cmp::Ordering;
use std::collections::HashSet;

use crate::modeling::information::information;
use crate::selection::constraints::SelectionConstraints;
use crate::types::{AbilityEstimate, Item};

/// Maximum-information item selection.
#[derive(Debug, Clone)]
pub struct ItemSelector {
    information_cap: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    item: &'a Item,
    information: f64,
}

impl<'a> Candidate<'a> {
    /// Higher information wins; equal information falls back to the lower id.
    fn better_than(&self, other: &Candidate<'_>) -> bool {
        match self.information.partial_cmp(&other.information) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Less) => false,
            _ => self.item.id < other.item.id,
        }
    }
}

impl ItemSelector {
    pub fn new(information_cap: f64) -> Self {
        Self { information_cap }
    }

    /// Picks the most informative item at the current estimate, or `None`
    /// when nothing selectable is left.
    pub fn select_next<'a>(
        &self,
        available: &'a [Item],
        estimate: &AbilityEstimate,
        administered: &[Item],
        constraints: &SelectionConstraints,
    ) -> Option<&'a Item> {
        let seen: HashSet<&str> = administered.iter().map(|item| item.id.as_str()).collect();

        let remaining: Vec<&'a Item> = available
            .iter()
            .filter(|item| !seen.contains(item.id.as_str()))
            .filter(|item| {
                constraints
                    .exposure
                    .as_ref()
                    .map_or(true, |cap| cap.allows(item))
            })
            .collect();

        if remaining.is_empty() {
            return None;
        }

        let unmet = if constraints.content.is_empty() {
            Vec::new()
        } else {
            let administered_refs: Vec<&Item> = administered.iter().collect();
            constraints.content.unmet_tags(&administered_refs)
        };
        let targeted: Vec<&'a Item> = if unmet.is_empty() {
            Vec::new()
        } else {
            remaining
                .iter()
                .copied()
                .filter(|item| {
                    item.content_tag
                        .as_deref()
                        .map_or(false, |tag| unmet.contains(&tag))
                })
                .collect()
        };

        let pool = if targeted.is_empty() {
            if !unmet.is_empty() {
                tracing::debug!(?unmet, "no items left for unmet content tags, using full pool");
            }
            &remaining
        } else {
            &targeted
        };

        let best = pool
            .iter()
            .map(|&item| Candidate {
                item,
                information: information(estimate.theta, item, self.information_cap),
            })
            .reduce(|best, candidate| {
                if candidate.better_than(&best) {
                    candidate
                } else {
                    best
                }
            })?;

        tracing::debug!(
            item_id = %best.item.id,
            theta = estimate.theta,
            information = best.information,
            candidates = pool.len(),
            "selected next item"
        );

        Some(best.item)
    }
}
