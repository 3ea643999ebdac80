//! Stop/continue decision for a session.
//!
//! Rules, in priority order:
//! 1. `answered >= max_questions` ends the test with `MaxLengthReached`.
//! 2. Precision ends it only once `answered` clears both `min_questions` and
//!    the `absolute_minimum_questions` floor.
//! 3. No selectable item ends it with `PoolExhausted`.

use crate::config::TerminationCriteria;
use crate::types::TerminationReason;

#[derive(Debug, Clone, PartialEq)]
pub enum Transition<T> {
    Continue(T),
    Terminate(TerminationReason),
}

#[derive(Debug, Clone)]
pub struct TerminationController {
    criteria: TerminationCriteria,
}

impl TerminationController {
    pub fn new(criteria: TerminationCriteria) -> Self {
        Self { criteria }
    }

    /// Length and precision rules only.
    pub fn check_counters(&self, answered: usize, standard_error: f64) -> Option<TerminationReason> {
        let c = &self.criteria;
        if answered >= c.max_questions {
            return Some(TerminationReason::MaxLengthReached);
        }
        if answered >= c.min_questions
            && answered >= c.absolute_minimum_questions
            && standard_error <= c.standard_error_threshold
        {
            return Some(TerminationReason::PrecisionReached);
        }
        None
    }

    /// Full transition. `next_item` is only consulted when the counters allow
    /// the test to continue.
    pub fn evaluate<T>(
        &self,
        answered: usize,
        standard_error: f64,
        next_item: impl FnOnce() -> Option<T>,
    ) -> Transition<T> {
        if let Some(reason) = self.check_counters(answered, standard_error) {
            return Transition::Terminate(reason);
        }
        match next_item() {
            Some(item) => Transition::Continue(item),
            None => Transition::Terminate(TerminationReason::PoolExhausted),
        }
    }
}
