//! Maximum-likelihood ability estimation under the 2PL model.
//!
//! Every call recomputes the estimate from the complete response history by
//! Newton-Raphson, starting from the prior theta. Each Newton step is capped
//! at `max_step_size`. All-correct and all-incorrect histories have no finite
//! MLE; for those the whole call may not move theta further than
//! `max_step_size` from the prior, so the estimate walks one step per response
//! toward the theta bound. Mixed histories converge to the MLE regardless of
//! the prior.

use crate::config::EstimationConfig;
use crate::error::EstimationError;
use crate::modeling::information::{information, raw_information};
use crate::modeling::response_model::probability_correct;
use crate::types::{AbilityEstimate, Item, Response};

/// Below this total information the likelihood is treated as flat.
pub const INFORMATION_FLOOR: f64 = 1e-6;

#[derive(Debug, Clone)]
pub struct AbilityEstimator {
    config: EstimationConfig,
    information_cap: f64,
}

impl AbilityEstimator {
    pub fn new(config: EstimationConfig, information_cap: f64) -> Self {
        Self {
            config,
            information_cap,
        }
    }

    pub fn config(&self) -> &EstimationConfig {
        &self.config
    }

    /// `items[i]` must be the item answered by `responses[i]`.
    pub fn estimate(
        &self,
        responses: &[Response],
        items: &[Item],
        prior: &AbilityEstimate,
    ) -> Result<AbilityEstimate, EstimationError> {
        check_history(responses, items)?;

        if responses.is_empty() {
            return Ok(AbilityEstimate::initial(prior.theta));
        }

        let step = self.config.max_step_size;
        let (lower, upper) = if has_finite_mle(responses) {
            (f64::NEG_INFINITY, f64::INFINITY)
        } else {
            (prior.theta - step, prior.theta + step)
        };

        let mut theta = prior.theta;
        let mut converged = false;
        let mut iterations = 0u32;

        while iterations < self.config.max_newton_iterations {
            iterations += 1;
            let (score, info) = self.score_and_information(theta, responses, items);
            if info < INFORMATION_FLOOR {
                tracing::debug!(theta, info, "likelihood is flat, stopping Newton iteration");
                break;
            }

            let newton_step = score / info;
            let next = (theta + newton_step.clamp(-step, step)).clamp(lower, upper);
            let moved = (next - theta).abs();
            theta = next;

            if moved < self.config.convergence_tolerance {
                // A step pinned against the streak limit is not convergence.
                converged = newton_step.abs() < self.config.convergence_tolerance;
                break;
            }
        }

        let total_information = self.total_information(theta, items);
        let standard_error = if total_information < INFORMATION_FLOOR {
            f64::INFINITY
        } else {
            1.0 / total_information.sqrt()
        };

        let bounds = self.config.theta_bounds;
        let clamped = !bounds.contains(theta);
        if clamped {
            tracing::debug!(
                theta,
                min = bounds.min,
                max = bounds.max,
                "ability estimate clamped to theta bounds"
            );
            theta = bounds.clamp(theta);
        }

        Ok(AbilityEstimate {
            theta,
            standard_error,
            clamped,
            converged,
            iterations,
        })
    }

    /// First derivative of the log-likelihood and its (negated) second
    /// derivative at `theta`. The curvature is uncapped; the cap only enters
    /// the reported standard error.
    pub fn score_and_information(
        &self,
        theta: f64,
        responses: &[Response],
        items: &[Item],
    ) -> (f64, f64) {
        responses
            .iter()
            .zip(items)
            .fold((0.0, 0.0), |(score, info), (response, item)| {
                let p = probability_correct(theta, item);
                let u = if response.correct { 1.0 } else { 0.0 };
                (
                    score + item.discrimination * (u - p),
                    info + raw_information(item.discrimination, p),
                )
            })
    }

    pub fn total_information(&self, theta: f64, items: &[Item]) -> f64 {
        items
            .iter()
            .map(|item| information(theta, item, self.information_cap))
            .sum()
    }
}

/// The likelihood has an interior maximum only when the history mixes
/// correct and incorrect responses.
fn has_finite_mle(responses: &[Response]) -> bool {
    let correct = responses.iter().filter(|r| r.correct).count();
    correct > 0 && correct < responses.len()
}

fn check_history(responses: &[Response], items: &[Item]) -> Result<(), EstimationError> {
    if responses.len() != items.len() {
        return Err(EstimationError::LengthMismatch {
            responses: responses.len(),
            items: items.len(),
        });
    }
    for (index, (response, item)) in responses.iter().zip(items).enumerate() {
        if response.item_id != item.id {
            return Err(EstimationError::UnknownItem {
                index,
                item: item.id.clone(),
                response_item: response.item_id.clone(),
            });
        }
    }
    Ok(())
}
