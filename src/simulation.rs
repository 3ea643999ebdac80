//! Monte-Carlo evaluation of an engine configuration.
//!
//! A simulee answers each item correctly with the 2PL probability at its true
//! ability. Simulee `i` of a batch draws from `ChaCha8Rng::seed_from_u64(seed + i)`,
//! so batch results do not depend on how rayon schedules the work.

use std::collections::BTreeMap;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use crate::engine::{Engine, Outcome};
use crate::error::SessionError;
use crate::modeling::probability_correct;
use crate::types::{AbilityEstimate, Response, TerminationReason};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationOutcome {
    pub true_theta: f64,
    pub final_estimate: AbilityEstimate,
    pub reason: TerminationReason,
    pub answered: usize,
}

impl SimulationOutcome {
    pub fn error(&self) -> f64 {
        self.final_estimate.theta - self.true_theta
    }
}

pub fn simulate_session<R: Rng>(
    engine: &Engine,
    true_theta: f64,
    rng: &mut R,
) -> Result<SimulationOutcome, SessionError> {
    let mut session = engine.start_session();
    let mut response = None;

    loop {
        let step = engine.advance(&session, response.take())?;
        match step.outcome {
            Outcome::NextItem(item) => {
                let correct = rng.gen::<f64>() < probability_correct(true_theta, &item);
                response = Some(Response::new(item.id, correct));
                session = step.session;
            }
            Outcome::Terminated {
                reason,
                final_estimate,
            } => {
                return Ok(SimulationOutcome {
                    true_theta,
                    final_estimate,
                    reason,
                    answered: step.session.answered_count(),
                });
            }
        }
    }
}

pub fn simulate_batch(
    engine: &Engine,
    true_thetas: &[f64],
    seed: u64,
) -> Result<Vec<SimulationOutcome>, SessionError> {
    true_thetas
        .par_iter()
        .enumerate()
        .map(|(i, &theta)| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed.wrapping_add(i as u64));
            simulate_session(engine, theta, &mut rng)
        })
        .collect()
}

/// Standard normal abilities via Box-Muller, clamped to `[min, max]`.
pub fn draw_abilities(count: usize, seed: u64, min: f64, max: f64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let u1 = rng.gen::<f64>().max(f64::MIN_POSITIVE);
            let u2 = rng.gen::<f64>();
            let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
            z.clamp(min, max)
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationSummary {
    pub simulees: usize,
    pub bias: f64,
    pub rmse: f64,
    pub mean_length: f64,
    /// Mean over simulees whose final standard error is finite.
    pub mean_standard_error: Option<f64>,
    pub reasons: BTreeMap<String, usize>,
}

impl SimulationSummary {
    pub fn from_outcomes(outcomes: &[SimulationOutcome]) -> Self {
        if outcomes.is_empty() {
            return Self::default();
        }
        let n = outcomes.len() as f64;

        let bias = outcomes.iter().map(SimulationOutcome::error).sum::<f64>() / n;
        let rmse = (outcomes.iter().map(|o| o.error().powi(2)).sum::<f64>() / n).sqrt();
        let mean_length = outcomes.iter().map(|o| o.answered as f64).sum::<f64>() / n;

        let finite: Vec<f64> = outcomes
            .iter()
            .map(|o| &o.final_estimate)
            .filter(|estimate| estimate.has_information())
            .map(|estimate| estimate.standard_error)
            .collect();
        let mean_standard_error = if finite.is_empty() {
            None
        } else {
            Some(finite.iter().sum::<f64>() / finite.len() as f64)
        };

        let mut reasons = BTreeMap::new();
        for outcome in outcomes {
            *reasons.entry(outcome.reason.as_str().to_string()).or_insert(0) += 1;
        }

        Self {
            simulees: outcomes.len(),
            bias,
            rmse,
            mean_length,
            mean_standard_error,
            reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::synthetic_bank;
    use crate::config::{EngineConfig, TerminationCriteria};

    fn engine() -> Engine {
        let config = EngineConfig {
            termination: TerminationCriteria {
                min_questions: 5,
                max_questions: 25,
                ..Default::default()
            },
            ..Default::default()
        };
        Engine::new(config, synthetic_bank(150, 3)).unwrap()
    }

    #[test]
    fn test_session_respects_length_bounds() {
        let engine = engine();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        for theta in [-2.0, 0.0, 1.5] {
            let outcome = simulate_session(&engine, theta, &mut rng).unwrap();
            assert!(outcome.answered >= 5 && outcome.answered <= 25);
            assert!(outcome.final_estimate.theta.abs() <= 4.0);
            assert_ne!(outcome.reason, TerminationReason::PoolExhausted);
        }
    }

    #[test]
    fn test_batch_is_reproducible() {
        let engine = engine();
        let thetas = draw_abilities(16, 5, -3.0, 3.0);
        let a = simulate_batch(&engine, &thetas, 99).unwrap();
        let b = simulate_batch(&engine, &thetas, 99).unwrap();
        assert_eq!(a.len(), 16);
        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.final_estimate, y.final_estimate);
            assert_eq!(x.answered, y.answered);
            assert_eq!(x.reason, y.reason);
        }
    }

    #[test]
    fn test_estimates_track_true_ability() {
        let engine = engine();
        let thetas = draw_abilities(200, 1, -2.5, 2.5);
        let outcomes = simulate_batch(&engine, &thetas, 2024).unwrap();
        let summary = SimulationSummary::from_outcomes(&outcomes);
        assert_eq!(summary.simulees, 200);
        assert!(summary.rmse < 0.8, "rmse = {}", summary.rmse);
        assert!(summary.bias.abs() < 0.3, "bias = {}", summary.bias);
        assert_eq!(summary.reasons.values().sum::<usize>(), 200);
    }

    #[test]
    fn test_draw_abilities_bounded() {
        let thetas = draw_abilities(1000, 8, -1.0, 1.0);
        assert!(thetas.iter().all(|t| (-1.0..=1.0).contains(t)));
        let mean = thetas.iter().sum::<f64>() / thetas.len() as f64;
        assert!(mean.abs() < 0.15);
    }

    #[test]
    fn test_empty_summary() {
        let summary = SimulationSummary::from_outcomes(&[]);
        assert_eq!(summary.simulees, 0);
        assert!(summary.mean_standard_error.is_none());
    }
}
