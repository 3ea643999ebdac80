use chrono::Utc;

use crate::config::{validate_items, EngineConfig};
use crate::error::{ConfigError, SessionError};
use crate::modeling::AbilityEstimator;
use crate::selection::{ItemSelector, SelectionConstraints};
use crate::termination::{TerminationController, Transition};
use crate::types::{AbilityEstimate, Item, Response, Session, SessionStatus, TerminationReason};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    NextItem(Item),
    Terminated {
        reason: TerminationReason,
        final_estimate: AbilityEstimate,
    },
}

impl Outcome {
    pub fn next_item(&self) -> Option<&Item> {
        match self {
            Self::NextItem(item) => Some(item),
            Self::Terminated { .. } => None,
        }
    }

    pub fn termination_reason(&self) -> Option<TerminationReason> {
        match self {
            Self::NextItem(_) => None,
            Self::Terminated { reason, .. } => Some(*reason),
        }
    }
}

/// The new session state together with the decision taken.
#[derive(Debug, Clone)]
pub struct Advance {
    pub session: Session,
    pub outcome: Outcome,
}

/// Immutable engine shared by any number of sessions.
#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
    items: Vec<Item>,
    constraints: SelectionConstraints,
    estimator: AbilityEstimator,
    selector: ItemSelector,
    termination: TerminationController,
}

impl Engine {
    pub fn new(config: EngineConfig, items: Vec<Item>) -> Result<Self, ConfigError> {
        config.validate()?;
        validate_items(&items)?;

        Ok(Self {
            estimator: AbilityEstimator::new(config.estimation.clone(), config.information_cap),
            selector: ItemSelector::new(config.information_cap),
            termination: TerminationController::new(config.termination.clone()),
            constraints: SelectionConstraints::default(),
            config,
            items,
        })
    }

    pub fn with_constraints(mut self, constraints: SelectionConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn estimator(&self) -> &AbilityEstimator {
        &self.estimator
    }

    pub fn start_session(&self) -> Session {
        let session = Session::new(self.config.starting_ability);
        tracing::debug!(session_id = %session.id, theta = session.estimate.theta, "session started");
        session
    }

    /// Applies `response` to the pending item (if given) and decides what
    /// happens next. `session` itself is never modified; the updated state is
    /// returned in [`Advance::session`].
    pub fn advance(
        &self,
        session: &Session,
        response: Option<Response>,
    ) -> Result<Advance, SessionError> {
        self.advance_with(session, response, &self.constraints)
    }

    /// Like [`Engine::advance`], but selects under `constraints` instead of the
    /// engine-wide defaults, e.g. with exposure counts refreshed by the caller.
    pub fn advance_with(
        &self,
        session: &Session,
        response: Option<Response>,
        constraints: &SelectionConstraints,
    ) -> Result<Advance, SessionError> {
        if session.is_terminated() {
            return self.replay_termination(session, response.is_some());
        }

        let mut next = session.clone();

        match response {
            Some(response) => {
                let pending = session.pending_item().ok_or_else(|| {
                    tracing::warn!(session_id = %session.id, "response received with no pending item");
                    SessionError::NoPendingItem(session.id)
                })?;
                if pending.id != response.item_id {
                    tracing::warn!(
                        session_id = %session.id,
                        expected = %pending.id,
                        actual = %response.item_id,
                        "response does not match pending item"
                    );
                    return Err(SessionError::ItemMismatch {
                        expected: pending.id.clone(),
                        actual: response.item_id,
                    });
                }

                next.responses.push(response);
                next.estimate =
                    self.estimator
                        .estimate(&next.responses, next.answered_items(), &session.estimate)?;

                tracing::debug!(
                    session_id = %next.id,
                    answered = next.answered_count(),
                    theta = next.estimate.theta,
                    standard_error = next.estimate.standard_error,
                    iterations = next.estimate.iterations,
                    converged = next.estimate.converged,
                    "ability re-estimated"
                );
            }
            None => {
                if let Some(pending) = session.pending_item() {
                    return Ok(Advance {
                        outcome: Outcome::NextItem(pending.clone()),
                        session: next,
                    });
                }
            }
        }

        let transition = self.termination.evaluate(
            next.answered_count(),
            next.estimate.standard_error,
            || {
                self.selector.select_next(
                    &self.items,
                    &next.estimate,
                    &next.administered_items,
                    constraints,
                )
            },
        );

        next.updated_at = Utc::now();

        let outcome = match transition {
            Transition::Continue(item) => {
                next.administered_items.push(item.clone());
                Outcome::NextItem(item.clone())
            }
            Transition::Terminate(reason) => {
                next.status = SessionStatus::Terminated;
                next.termination_reason = Some(reason);
                tracing::info!(
                    session_id = %next.id,
                    reason = %reason,
                    answered = next.answered_count(),
                    theta = next.estimate.theta,
                    standard_error = next.estimate.standard_error,
                    "session terminated"
                );
                Outcome::Terminated {
                    reason,
                    final_estimate: next.estimate,
                }
            }
        };

        Ok(Advance {
            session: next,
            outcome,
        })
    }

    fn replay_termination(
        &self,
        session: &Session,
        has_response: bool,
    ) -> Result<Advance, SessionError> {
        if has_response {
            tracing::warn!(session_id = %session.id, "response submitted to terminated session");
            return Err(SessionError::Terminated(session.id));
        }
        let reason = session
            .termination_reason
            .ok_or(SessionError::MissingTerminationReason(session.id))?;

        Ok(Advance {
            session: session.clone(),
            outcome: Outcome::Terminated {
                reason,
                final_estimate: session.estimate,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TerminationCriteria;
    use crate::error::EstimationError;
    use crate::selection::ExposureCap;

    fn bank(n: usize) -> Vec<Item> {
        (0..n)
            .map(|i| Item::new(format!("q{i:02}"), 1.0, -2.0 + 4.0 * i as f64 / n as f64))
            .collect()
    }

    fn engine(min: usize, max: usize) -> Engine {
        let config = EngineConfig {
            termination: TerminationCriteria {
                min_questions: min,
                max_questions: max,
                ..Default::default()
            },
            ..Default::default()
        };
        Engine::new(config, bank(20)).unwrap()
    }

    fn answer(engine: &Engine, session: &Session, correct: bool) -> Advance {
        let pending = session.pending_item().unwrap();
        engine
            .advance(session, Some(Response::new(pending.id.clone(), correct)))
            .unwrap()
    }

    #[test]
    fn test_first_call_returns_item() {
        let engine = engine(5, 10);
        let session = engine.start_session();
        let step = engine.advance(&session, None).unwrap();

        let item = step.outcome.next_item().unwrap();
        assert_eq!(step.session.pending_item(), Some(item));
        assert_eq!(step.session.administered_items.len(), 1);
        assert!(step.session.responses.is_empty());
        assert!(session.administered_items.is_empty());
    }

    #[test]
    fn test_refetch_returns_pending_item() {
        let engine = engine(5, 10);
        let first = engine.advance(&engine.start_session(), None).unwrap();
        let again = engine.advance(&first.session, None).unwrap();
        assert_eq!(again.outcome, first.outcome);
        assert_eq!(again.session.administered_items.len(), 1);
    }

    #[test]
    fn test_response_for_wrong_item_rejected() {
        let engine = engine(5, 10);
        let first = engine.advance(&engine.start_session(), None).unwrap();
        let err = engine
            .advance(&first.session, Some(Response::new("not-shown", true)))
            .unwrap_err();
        assert!(matches!(err, SessionError::ItemMismatch { .. }));
    }

    #[test]
    fn test_response_without_pending_item_rejected() {
        let engine = engine(5, 10);
        let session = engine.start_session();
        let err = engine
            .advance(&session, Some(Response::new("q00", true)))
            .unwrap_err();
        assert_eq!(err, SessionError::NoPendingItem(session.id));
    }

    #[test]
    fn test_terminated_session_is_frozen() {
        let engine = engine(3, 3);
        let mut step = engine.advance(&engine.start_session(), None).unwrap();
        for _ in 0..3 {
            step = answer(&engine, &step.session, true);
        }
        assert_eq!(
            step.outcome.termination_reason(),
            Some(TerminationReason::MaxLengthReached)
        );

        let replay = engine.advance(&step.session, None).unwrap();
        assert_eq!(replay.outcome, step.outcome);
        assert_eq!(replay.session, step.session);

        let err = engine
            .advance(&step.session, Some(Response::new("q00", true)))
            .unwrap_err();
        assert_eq!(err, SessionError::Terminated(step.session.id));
    }

    #[test]
    fn test_tampered_history_surfaces_estimation_error() {
        let engine = engine(5, 10);
        let mut step = engine.advance(&engine.start_session(), None).unwrap();
        step = answer(&engine, &step.session, true);

        let mut tampered = step.session.clone();
        tampered.responses[0].item_id = "q99".to_string();
        let pending = tampered.pending_item().unwrap().id.clone();
        let err = engine
            .advance(&tampered, Some(Response::new(pending, false)))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Estimation(EstimationError::UnknownItem { index: 0, .. })
        ));
    }

    #[test]
    fn test_exposure_counts_apply_per_call() {
        let engine = engine(5, 10);
        let session = engine.start_session();
        let open = engine.advance(&session, None).unwrap();
        let favourite = open.outcome.next_item().unwrap().id.clone();

        let capped = SelectionConstraints {
            exposure: Some(ExposureCap::new(1).with_count(favourite.clone(), 1)),
            ..Default::default()
        };
        let step = engine.advance_with(&session, None, &capped).unwrap();
        let item = step.outcome.next_item().unwrap();
        assert_ne!(item.id, favourite);
        assert_eq!(step.session.pending_item(), Some(item));

        // the engine-wide defaults are untouched
        let again = engine.advance(&session, None).unwrap();
        assert_eq!(again.outcome, open.outcome);
    }

    #[test]
    fn test_invalid_item_refuses_engine() {
        let items = vec![Item::new("q1", 1.0, 0.0), Item::new("q2", 0.0, 0.0)];
        let err = Engine::new(EngineConfig::default(), items).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDiscrimination { .. }));
    }
}
