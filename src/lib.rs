//! # adaptive-testing-engine
//!
//! Computerized adaptive testing core under the two-parameter logistic (2PL)
//! model:
//!
//! - [`modeling`] - response probability, item information and Newton-Raphson
//!   ability estimation
//! - [`selection`] - maximum-information item selection with content coverage
//!   and a simple exposure cap
//! - [`termination`] - precision / length / pool-exhaustion stopping rules
//! - [`engine`] - `advance(session, response)` orchestration
//! - [`simulation`] - simulated test-takers for evaluating a configuration
//! - [`bank`] - JSON item bank loading and synthetic pools
//!
//! The engine performs no I/O and holds no per-session state: a [`Session`]
//! goes in, an updated [`Session`] and a decision come out.
//!
//! ```rust
//! use adaptive_testing_engine::{Engine, EngineConfig, Item, Outcome, Response};
//!
//! let items = vec![Item::new("q1", 1.2, -0.5), Item::new("q2", 0.9, 0.4)];
//! let engine = Engine::new(EngineConfig::default(), items).unwrap();
//!
//! let step = engine.advance(&engine.start_session(), None).unwrap();
//! if let Outcome::NextItem(item) = &step.outcome {
//!     let step = engine
//!         .advance(&step.session, Some(Response::new(item.id.clone(), true)))
//!         .unwrap();
//!     assert!(step.session.estimate.theta > 0.0);
//! }
//! ```

pub mod bank;
pub mod config;
pub mod engine;
pub mod error;
pub mod logging;
pub mod modeling;
pub mod selection;
pub mod simulation;
pub mod termination;
pub mod types;

pub use config::{EngineConfig, EstimationConfig, TerminationCriteria, ThetaBounds};
pub use engine::{Advance, Engine, Outcome};
pub use error::{BankError, ConfigError, EngineError, EstimationError, SessionError};
pub use modeling::{information, probability_correct, AbilityEstimator};
pub use selection::{ContentConstraints, ExposureCap, ItemSelector, SelectionConstraints};
pub use termination::{TerminationController, Transition};
pub use types::*;
