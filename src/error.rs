use thiserror::Error;

/// Fatal configuration problems. The engine refuses to start rather than
/// produce meaningless estimates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("item {item_id}: discrimination must be positive and finite, got {value}")]
    InvalidDiscrimination { item_id: String, value: f64 },
    #[error("item {item_id}: difficulty must be finite, got {value}")]
    InvalidDifficulty { item_id: String, value: f64 },
    #[error("item id must not be empty")]
    EmptyItemId,
    #[error("duplicate item id: {0}")]
    DuplicateItem(String),
    #[error("min_questions ({min}) exceeds max_questions ({max})")]
    QuestionBounds { min: usize, max: usize },
    #[error("max_questions must be at least 1")]
    ZeroMaxQuestions,
    #[error("max_questions ({max}) is below absolute_minimum_questions ({floor})")]
    MaxBelowFloor { max: usize, floor: usize },
    #[error("{name} must be non-negative and finite, got {value}")]
    NegativeThreshold { name: &'static str, value: f64 },
    #[error("{name} must be positive and finite, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("max_newton_iterations must be at least 1")]
    ZeroIterations,
    #[error("theta bounds [{min}, {max}] are empty or not finite")]
    ThetaBounds { min: f64, max: f64 },
    #[error("starting ability {value} lies outside theta bounds [{min}, {max}]")]
    StartingAbility { value: f64, min: f64, max: f64 },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("response history has {responses} responses for {items} items")]
    LengthMismatch { responses: usize, items: usize },
    #[error("response {index} answers item {response_item} but item {item} was administered")]
    UnknownItem {
        index: usize,
        item: String,
        response_item: String,
    },
}

/// Caller protocol misuse. The session passed in is left untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("session {0} is terminated and accepts no further responses")]
    Terminated(uuid::Uuid),
    #[error("session {0} is terminated but records no termination reason")]
    MissingTerminationReason(uuid::Uuid),
    #[error("session {0} has no item awaiting a response")]
    NoPendingItem(uuid::Uuid),
    #[error("response is for item {actual} but item {expected} is pending")]
    ItemMismatch { expected: String, actual: String },
    #[error(transparent)]
    Estimation(#[from] EstimationError),
}

#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to read item bank {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("item bank JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("item bank is empty")]
    Empty,
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Bank(#[from] BankError),
}
