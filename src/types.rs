use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A calibrated item under the 2PL model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    /// `a`, must be positive.
    pub discrimination: f64,
    /// `b`, the ability at which correct and incorrect are equally likely.
    pub difficulty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_tag: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, discrimination: f64, difficulty: f64) -> Self {
        Self {
            id: id.into(),
            discrimination,
            difficulty,
            content_tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.content_tag = Some(tag.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub item_id: String,
    pub correct: bool,
    pub timestamp: DateTime<Utc>,
}

impl Response {
    pub fn new(item_id: impl Into<String>, correct: bool) -> Self {
        Self::at(item_id, correct, Utc::now())
    }

    pub fn at(item_id: impl Into<String>, correct: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            item_id: item_id.into(),
            correct,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbilityEstimate {
    pub theta: f64,
    /// `+inf` until the history carries information. Serialized as `null` in that case.
    #[serde(with = "finite_or_null")]
    pub standard_error: f64,
    /// The final theta was pulled back into the supported range.
    #[serde(default)]
    pub clamped: bool,
    #[serde(default)]
    pub converged: bool,
    #[serde(default)]
    pub iterations: u32,
}

impl AbilityEstimate {
    pub fn initial(theta: f64) -> Self {
        Self {
            theta,
            standard_error: f64::INFINITY,
            clamped: false,
            converged: false,
            iterations: 0,
        }
    }

    pub fn has_information(&self) -> bool {
        self.standard_error.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    #[default]
    InProgress,
    Terminated,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InProgress => "IN_PROGRESS",
            Self::Terminated => "TERMINATED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminationReason {
    PrecisionReached,
    MaxLengthReached,
    PoolExhausted,
}

impl TerminationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PrecisionReached => "PRECISION_REACHED",
            Self::MaxLengthReached => "MAX_LENGTH_REACHED",
            Self::PoolExhausted => "POOL_EXHAUSTED",
        }
    }
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One adaptive test administration.
///
/// `administered_items` may run one ahead of `responses`: the last item is then
/// shown but not yet answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub administered_items: Vec<Item>,
    pub responses: Vec<Response>,
    pub estimate: AbilityEstimate,
    pub status: SessionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<TerminationReason>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(starting_ability: f64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            administered_items: Vec::new(),
            responses: Vec::new(),
            estimate: AbilityEstimate::initial(starting_ability),
            status: SessionStatus::InProgress,
            termination_reason: None,
            started_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.status == SessionStatus::Terminated
    }

    pub fn answered_count(&self) -> usize {
        self.responses.len()
    }

    pub fn correct_count(&self) -> usize {
        self.responses.iter().filter(|r| r.correct).count()
    }

    /// The item shown but not yet answered, if any.
    pub fn pending_item(&self) -> Option<&Item> {
        if self.administered_items.len() == self.responses.len() + 1 {
            self.administered_items.last()
        } else {
            None
        }
    }

    pub fn administered_ids(&self) -> impl Iterator<Item = &str> {
        self.administered_items.iter().map(|item| item.id.as_str())
    }

    pub fn report(&self) -> SessionReport {
        SessionReport::from(self)
    }

    /// Items paired with their responses, in administration order.
    pub fn answered_items(&self) -> &[Item] {
        let answered = self.responses.len().min(self.administered_items.len());
        &self.administered_items[..answered]
    }
}

/// Downstream view of a session for gradebook and analytics consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: Uuid,
    pub status: SessionStatus,
    pub theta: f64,
    #[serde(with = "finite_or_null")]
    pub standard_error: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub termination_reason: Option<TerminationReason>,
    pub answered: usize,
    pub correct: usize,
}

impl From<&Session> for SessionReport {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id,
            status: session.status,
            theta: session.estimate.theta,
            standard_error: session.estimate.standard_error,
            termination_reason: session.termination_reason,
            answered: session.answered_count(),
            correct: session.correct_count(),
        }
    }
}

/// JSON has no infinity; a non-finite value round-trips through `null`.
mod finite_or_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_empty() {
        let session = Session::new(0.5);
        assert_eq!(session.status, SessionStatus::InProgress);
        assert!(session.administered_items.is_empty());
        assert!(session.responses.is_empty());
        assert_eq!(session.estimate.theta, 0.5);
        assert!(session.estimate.standard_error.is_infinite());
        assert!(!session.estimate.has_information());
        assert!(session.termination_reason.is_none());
        assert!(session.pending_item().is_none());
    }

    #[test]
    fn test_pending_item() {
        let mut session = Session::new(0.0);
        session.administered_items.push(Item::new("q1", 1.0, 0.0));
        assert_eq!(session.pending_item().map(|i| i.id.as_str()), Some("q1"));
        assert!(session.answered_items().is_empty());

        session.responses.push(Response::new("q1", true));
        assert!(session.pending_item().is_none());
        assert_eq!(session.answered_items().len(), 1);
        assert_eq!(session.correct_count(), 1);
    }

    #[test]
    fn test_infinite_standard_error_round_trip() {
        let session = Session::new(0.0);
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"standardError\":null"));

        let restored: Session = serde_json::from_str(&json).unwrap();
        assert!(restored.estimate.standard_error.is_infinite());
        assert_eq!(restored.id, session.id);
    }

    #[test]
    fn test_termination_reason_wire_names() {
        let json = serde_json::to_string(&TerminationReason::MaxLengthReached).unwrap();
        assert_eq!(json, "\"MAX_LENGTH_REACHED\"");
        assert_eq!(TerminationReason::PoolExhausted.to_string(), "POOL_EXHAUSTED");
    }

    #[test]
    fn test_item_tag_is_optional_in_json() {
        let item: Item =
            serde_json::from_str(r#"{"id":"q9","discrimination":1.2,"difficulty":-0.4}"#).unwrap();
        assert_eq!(item.content_tag, None);

        let tagged: Item = serde_json::from_str(
            r#"{"id":"q9","discrimination":1.2,"difficulty":-0.4,"contentTag":"algebra"}"#,
        )
        .unwrap();
        assert_eq!(tagged.content_tag.as_deref(), Some("algebra"));
    }
}
