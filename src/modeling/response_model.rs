use crate::types::Item;

/// Bound on `a * (theta - b)` so the logistic never rounds to exactly 0 or 1.
pub const LOGIT_LIMIT: f64 = 35.0;

/// 2PL probability of a correct response, strictly inside (0, 1).
pub fn probability_correct(theta: f64, item: &Item) -> f64 {
    logistic(item.discrimination * (theta - item.difficulty))
}

pub fn logistic(z: f64) -> f64 {
    let z = z.clamp(-LOGIT_LIMIT, LOGIT_LIMIT);
    1.0 / (1.0 + (-z).exp())
}
