use serde::Serialize;
use serde_json::{Map, Value};

/// A job posting carried through from the backend. Only `id` is interpreted;
/// every other field stays as the backend sent it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobPosting {
    pub id: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// One scored job suggestion for a subject (candidate).
/// `score` is always finite and within `[0, 1]`; records that are not never get built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub subject_id: String,
    pub score: f64,
    pub target: JobPosting,
    /// Backend's own coarse label (HIGH / MEDIUM / LOW), passed through untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compatibility_level: Option<String>,
}
