use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Application lifecycle as stored by the backend. Deserializes from the
/// backend's wire names, serializes to our own snake_case names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationState {
    #[default]
    #[serde(rename(deserialize = "EN_ATTENTE", serialize = "pending"))]
    Pending,
    #[serde(rename(deserialize = "ACCEPTEE", serialize = "accepted"))]
    Accepted,
    #[serde(rename(deserialize = "REFUSEE", serialize = "rejected"))]
    Rejected,
}

/// An application to a job, with the matching score the backend computed for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredApplication {
    pub application_id: String,
    pub matching_score: f64,
    pub state: ApplicationState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<NaiveDateTime>,
    /// Candidate summary (name, email, cv path, ...). Opaque here.
    pub candidate: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<Value>,
}
