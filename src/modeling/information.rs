use crate::modeling::response_model::probability_correct;
use crate::types::Item;

/// Fisher information of `item` at `theta`, capped at `cap`.
///
/// The cap stops one very discriminating item near the estimate from
/// collapsing the standard error after a single response.
pub fn information(theta: f64, item: &Item, cap: f64) -> f64 {
    let p = probability_correct(theta, item);
    raw_information(item.discrimination, p).min(cap)
}

pub fn raw_information(discrimination: f64, p: f64) -> f64 {
    discrimination * discrimination * p * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_INFORMATION_CAP;

    #[test]
    fn test_peak_at_difficulty() {
        let item = Item::new("q", 1.0, 0.5);
        let at_b = information(0.5, &item, DEFAULT_INFORMATION_CAP);
        assert!((at_b - 0.25).abs() < 1e-12);
        assert!(information(1.5, &item, DEFAULT_INFORMATION_CAP) < at_b);
        assert!(information(-0.5, &item, DEFAULT_INFORMATION_CAP) < at_b);
    }

    #[test]
    fn test_cap_applied() {
        let item = Item::new("q", 4.0, 0.0);
        assert_eq!(raw_information(4.0, 0.5), 4.0);
        assert_eq!(information(0.0, &item, DEFAULT_INFORMATION_CAP), 2.0);
    }

    #[test]
    fn test_non_negative_far_from_item() {
        let item = Item::new("q", 2.0, 3.0);
        let info = information(-4.0, &item, DEFAULT_INFORMATION_CAP);
        assert!(info >= 0.0);
        assert!(info < 1e-5);
    }
}
