pub mod estimator;
pub mod information;
pub mod response_model;

pub use estimator::AbilityEstimator;
pub use information::information;
pub use response_model::probability_correct;
