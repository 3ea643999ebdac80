use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::Item;

pub const DEFAULT_INFORMATION_CAP: f64 = 2.0;
pub const DEFAULT_STANDARD_ERROR_THRESHOLD: f64 = 0.3;
pub const DEFAULT_ABSOLUTE_MINIMUM_QUESTIONS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminationCriteria {
    pub min_questions: usize,
    pub max_questions: usize,
    pub standard_error_threshold: f64,
    /// Hard floor below which precision never ends a test.
    pub absolute_minimum_questions: usize,
}

impl Default for TerminationCriteria {
    fn default() -> Self {
        Self {
            min_questions: 5,
            max_questions: 30,
            standard_error_threshold: DEFAULT_STANDARD_ERROR_THRESHOLD,
            absolute_minimum_questions: DEFAULT_ABSOLUTE_MINIMUM_QUESTIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThetaBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ThetaBounds {
    fn default() -> Self {
        Self { min: -4.0, max: 4.0 }
    }
}

impl ThetaBounds {
    pub fn contains(&self, theta: f64) -> bool {
        theta >= self.min && theta <= self.max
    }

    pub fn clamp(&self, theta: f64) -> f64 {
        theta.clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimationConfig {
    pub max_newton_iterations: u32,
    pub convergence_tolerance: f64,
    pub theta_bounds: ThetaBounds,
    /// Largest theta movement allowed per Newton step and per estimation call.
    pub max_step_size: f64,
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            max_newton_iterations: 15,
            convergence_tolerance: 1e-4,
            theta_bounds: ThetaBounds::default(),
            max_step_size: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub starting_ability: f64,
    pub information_cap: f64,
    pub termination: TerminationCriteria,
    pub estimation: EstimationConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            starting_ability: 0.0,
            information_cap: DEFAULT_INFORMATION_CAP,
            termination: TerminationCriteria::default(),
            estimation: EstimationConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(val) = env_parse("CAT_STARTING_ABILITY") {
            config.starting_ability = val;
        }
        if let Some(val) = env_parse("CAT_INFORMATION_CAP") {
            config.information_cap = val;
        }
        if let Some(val) = env_parse("CAT_MIN_QUESTIONS") {
            config.termination.min_questions = val;
        }
        if let Some(val) = env_parse("CAT_MAX_QUESTIONS") {
            config.termination.max_questions = val;
        }
        if let Some(val) = env_parse("CAT_STANDARD_ERROR_THRESHOLD") {
            config.termination.standard_error_threshold = val;
        }
        if let Some(val) = env_parse("CAT_ABSOLUTE_MINIMUM_QUESTIONS") {
            config.termination.absolute_minimum_questions = val;
        }
        if let Some(val) = env_parse("CAT_MAX_NEWTON_ITERATIONS") {
            config.estimation.max_newton_iterations = val;
        }
        if let Some(val) = env_parse("CAT_CONVERGENCE_TOLERANCE") {
            config.estimation.convergence_tolerance = val;
        }
        if let Some(val) = env_parse("CAT_THETA_MIN") {
            config.estimation.theta_bounds.min = val;
        }
        if let Some(val) = env_parse("CAT_THETA_MAX") {
            config.estimation.theta_bounds.max = val;
        }
        if let Some(val) = env_parse("CAT_MAX_STEP_SIZE") {
            config.estimation.max_step_size = val;
        }

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.termination;
        if t.max_questions == 0 {
            return Err(ConfigError::ZeroMaxQuestions);
        }
        if t.min_questions > t.max_questions {
            return Err(ConfigError::QuestionBounds {
                min: t.min_questions,
                max: t.max_questions,
            });
        }
        if t.max_questions < t.absolute_minimum_questions {
            return Err(ConfigError::MaxBelowFloor {
                max: t.max_questions,
                floor: t.absolute_minimum_questions,
            });
        }
        non_negative("standard_error_threshold", t.standard_error_threshold)?;

        let e = &self.estimation;
        positive("information_cap", self.information_cap)?;
        positive("convergence_tolerance", e.convergence_tolerance)?;
        positive("max_step_size", e.max_step_size)?;
        if e.max_newton_iterations == 0 {
            return Err(ConfigError::ZeroIterations);
        }

        let bounds = e.theta_bounds;
        if !(bounds.min.is_finite() && bounds.max.is_finite() && bounds.min < bounds.max) {
            return Err(ConfigError::ThetaBounds {
                min: bounds.min,
                max: bounds.max,
            });
        }
        if !self.starting_ability.is_finite() || !bounds.contains(self.starting_ability) {
            return Err(ConfigError::StartingAbility {
                value: self.starting_ability,
                min: bounds.min,
                max: bounds.max,
            });
        }

        Ok(())
    }
}

/// Checks calibration invariants for a pool supplied by the item bank.
pub fn validate_items(items: &[Item]) -> Result<(), ConfigError> {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        validate_item(item)?;
        if !seen.insert(item.id.as_str()) {
            return Err(ConfigError::DuplicateItem(item.id.clone()));
        }
    }
    Ok(())
}

pub fn validate_item(item: &Item) -> Result<(), ConfigError> {
    if item.id.is_empty() {
        return Err(ConfigError::EmptyItemId);
    }
    if !(item.discrimination.is_finite() && item.discrimination > 0.0) {
        return Err(ConfigError::InvalidDiscrimination {
            item_id: item.id.clone(),
            value: item.discrimination,
        });
    }
    if !item.difficulty.is_finite() {
        return Err(ConfigError::InvalidDifficulty {
            item_id: item.id.clone(),
            value: item.difficulty,
        });
    }
    Ok(())
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NegativeThreshold { name, value })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

/// Settings for the `cat-sim` binary.
#[derive(Debug, Clone)]
pub struct SimulationSettings {
    pub simulees: usize,
    pub seed: u64,
    pub item_bank: Option<PathBuf>,
    pub synthetic_bank_size: usize,
    pub log_level: String,
}

impl SimulationSettings {
    pub fn from_env() -> Self {
        let simulees = env_parse("CAT_SIM_SIMULEES").unwrap_or(500);
        let seed = env_parse("CAT_SIM_SEED").unwrap_or(42);
        let item_bank = std::env::var("CAT_ITEM_BANK")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let synthetic_bank_size = env_parse("CAT_SIM_BANK_SIZE").unwrap_or(300);
        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            simulees,
            seed,
            item_bank,
            synthetic_bank_size,
            log_level,
        }
    }
}
