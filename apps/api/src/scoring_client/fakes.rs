//! In-memory `ScoringBackend` for service and handler tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{ScoringBackend, ScoringError};

type Reply = Result<Vec<Value>, ScoringError>;

/// Scripted backend. Top-recommendation replies are consumed in order; once
/// the script runs out every call answers with an empty list.
#[derive(Default)]
pub struct FakeBackend {
    top_replies: Mutex<VecDeque<Reply>>,
    all_recommendations: Vec<Value>,
    applications: Vec<Value>,
    recalculation_fails: bool,
    delay: Option<Duration>,
    top_calls: AtomicUsize,
    recalc_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_reply(self, reply: Reply) -> Self {
        self.top_replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn with_all_recommendations(mut self, records: Vec<Value>) -> Self {
        self.all_recommendations = records;
        self
    }

    pub fn with_applications(mut self, records: Vec<Value>) -> Self {
        self.applications = records;
        self
    }

    pub fn with_failing_recalculation(mut self) -> Self {
        self.recalculation_fails = true;
        self
    }

    /// Every top-recommendation call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn top_calls(&self) -> usize {
        self.top_calls.load(Ordering::SeqCst)
    }

    pub fn recalc_calls(&self) -> usize {
        self.recalc_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoringBackend for FakeBackend {
    async fn fetch_top_recommendations(
        &self,
        _subject_id: &str,
        _limit: u32,
    ) -> Result<Vec<Value>, ScoringError> {
        self.top_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let reply = self.top_replies.lock().unwrap().pop_front();
        reply.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_all_recommendations(&self, _subject_id: &str) -> Result<Vec<Value>, ScoringError> {
        Ok(self.all_recommendations.clone())
    }

    async fn fetch_ranked_applications(&self, _job_id: &str) -> Result<Vec<Value>, ScoringError> {
        Ok(self.applications.clone())
    }

    async fn request_recalculation(&self) -> Result<(), ScoringError> {
        self.recalc_calls.fetch_add(1, Ordering::SeqCst);
        if self.recalculation_fails {
            return Err(ScoringError::from_status(409, "already running".into()));
        }
        Ok(())
    }
}

/// A well-formed recommendation record as the backend serializes it.
pub fn recommendation_record(job_id: u64, score: f64) -> Value {
    json!({
        "offre": {
            "idOffre": job_id,
            "titre": format!("Job {job_id}"),
            "localisation": "Tunis"
        },
        "score": score,
        "compatibiliteLevel": if score >= 0.7 { "HIGH" } else if score >= 0.4 { "MEDIUM" } else { "LOW" }
    })
}

/// A well-formed scored application record as the backend serializes it.
pub fn application_record(id: u64, matching_score: f64) -> Value {
    json!({
        "id": id,
        "matchingScore": matching_score,
        "etat": "EN_ATTENTE",
        "datePostulation": "2024-03-01T09:30:00",
        "candidat": { "id": id * 10, "nom": "Ben Ali", "prenom": "Sami" },
        "offre": { "idOffre": 1, "titre": "Backend engineer" }
    })
}

pub fn server_error() -> ScoringError {
    ScoringError::from_status(500, "scoring backend down".into())
}
