//! Record validation. Malformed backend records are dropped here and only
//! show up in the debug log; callers always get the valid subset.

use chrono::NaiveDateTime;
use serde_json::Value;
use tracing::debug;

use crate::models::{ApplicationState, JobPosting, Recommendation, ScoredApplication};

/// Builds a [`Recommendation`] from a raw backend record, or `None` when the
/// record has no usable score or no job id.
pub fn validate_recommendation(raw: &Value, subject_id: &str) -> Option<Recommendation> {
    let score = valid_score(raw.get("score")?)?;
    let offer = raw.get("offre")?.as_object()?;
    let id = parse_id(offer.get("idOffre")?)?;

    // `id` is serialized from the target itself.
    let mut payload = offer.clone();
    payload.remove("idOffre");
    payload.remove("id");

    let compatibility_level = raw
        .get("compatibiliteLevel")
        .and_then(Value::as_str)
        .map(str::to_string);

    Some(Recommendation {
        subject_id: subject_id.to_string(),
        score,
        target: JobPosting { id, payload },
        compatibility_level,
    })
}

/// Builds a [`ScoredApplication`] from a raw backend record.
/// A missing `etat` means pending; an unrecognised one rejects the record.
pub fn validate_scored_application(raw: &Value) -> Option<ScoredApplication> {
    let application_id = parse_id(raw.get("id")?)?;
    let matching_score = valid_score(raw.get("matchingScore")?)?;
    let candidate = raw.get("candidat").filter(|c| !c.is_null())?.clone();

    let state = match raw.get("etat") {
        None | Some(Value::Null) => ApplicationState::Pending,
        Some(value) => serde_json::from_value(value.clone()).ok()?,
    };

    let applied_at = raw
        .get("datePostulation")
        .and_then(Value::as_str)
        .and_then(|s| s.parse::<NaiveDateTime>().ok());

    let job = raw.get("offre").filter(|o| !o.is_null()).cloned();

    Some(ScoredApplication {
        application_id,
        matching_score,
        state,
        applied_at,
        candidate,
        job,
    })
}

pub fn filter_recommendations(records: &[Value], subject_id: &str) -> Vec<Recommendation> {
    let valid: Vec<Recommendation> = records
        .iter()
        .filter_map(|r| validate_recommendation(r, subject_id))
        .collect();
    log_dropped("recommendation", records.len(), valid.len());
    valid
}

pub fn filter_scored_applications(records: &[Value]) -> Vec<ScoredApplication> {
    let valid: Vec<ScoredApplication> = records
        .iter()
        .filter_map(validate_scored_application)
        .collect();
    log_dropped("application", records.len(), valid.len());
    valid
}

fn log_dropped(kind: &str, total: usize, kept: usize) {
    if kept < total {
        debug!("Dropped {} malformed {kind} records of {total}", total - kept);
    }
}

/// A score must be a finite JSON number within `[0, 1]`.
fn valid_score(value: &Value) -> Option<f64> {
    let score = value.as_f64()?;
    (score.is_finite() && (0.0..=1.0).contains(&score)).then_some(score)
}

/// Ids arrive as numbers (database keys) or strings. Zero and blank count as absent.
fn parse_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring_client::fakes::{application_record, recommendation_record};
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_valid_recommendation_keeps_payload() {
        let rec = validate_recommendation(&recommendation_record(12, 0.85), "u1").unwrap();
        assert_eq!(rec.subject_id, "u1");
        assert_eq!(rec.score, 0.85);
        assert_eq!(rec.target.id, "12");
        assert_eq!(rec.target.payload["titre"], "Job 12");
        assert!(!rec.target.payload.contains_key("idOffre"));
        assert_eq!(rec.compatibility_level.as_deref(), Some("HIGH"));
    }

    #[test]
    fn test_payload_id_does_not_shadow_target_id() {
        let raw = json!({ "offre": { "idOffre": 4, "id": 99, "titre": "Dup" }, "score": 0.5 });
        let rec = validate_recommendation(&raw, "u1").unwrap();
        assert!(!rec.target.payload.contains_key("id"));

        let out = serde_json::to_string(&rec.target).unwrap();
        assert_eq!(out.matches("\"id\"").count(), 1);
        assert_eq!(serde_json::to_value(&rec.target).unwrap()["id"], "4");
    }

    #[test]
    fn test_recommendation_missing_score_is_rejected() {
        let raw = json!({ "offre": { "idOffre": 3 } });
        assert!(validate_recommendation(&raw, "u1").is_none());
    }

    #[test]
    fn test_recommendation_non_numeric_score_is_rejected() {
        let raw = json!({ "offre": { "idOffre": 3 }, "score": "0.9" });
        assert!(validate_recommendation(&raw, "u1").is_none());
    }

    #[test]
    fn test_recommendation_out_of_range_score_is_rejected() {
        assert!(validate_recommendation(&recommendation_record(3, 1.2), "u1").is_none());
        assert!(validate_recommendation(&recommendation_record(3, -0.1), "u1").is_none());
    }

    #[test]
    fn test_recommendation_missing_target_id_is_rejected() {
        let raw = json!({ "offre": { "titre": "No id" }, "score": 0.5 });
        assert!(validate_recommendation(&raw, "u1").is_none());
        let raw = json!({ "offre": { "idOffre": 0 }, "score": 0.5 });
        assert!(validate_recommendation(&raw, "u1").is_none());
        let raw = json!({ "score": 0.5 });
        assert!(validate_recommendation(&raw, "u1").is_none());
    }

    #[test]
    fn test_score_bounds_are_inclusive() {
        assert!(validate_recommendation(&recommendation_record(1, 0.0), "u1").is_some());
        assert!(validate_recommendation(&recommendation_record(1, 1.0), "u1").is_some());
    }

    #[test]
    fn test_string_ids_are_accepted() {
        let raw = json!({ "offre": { "idOffre": " job-7 " }, "score": 0.4 });
        let rec = validate_recommendation(&raw, "u1").unwrap();
        assert_eq!(rec.target.id, "job-7");
    }

    #[test]
    fn test_ten_records_with_two_malformed_yield_eight() {
        let mut records: Vec<Value> = (1..=8)
            .map(|i| recommendation_record(i, i as f64 / 10.0))
            .collect();
        records.insert(3, json!({ "offre": { "idOffre": 99 } }));
        records.push(json!({ "score": 0.7, "offre": {} }));

        let valid = filter_recommendations(&records, "u1");
        assert_eq!(valid.len(), 8);
        let ids: Vec<&str> = valid.iter().map(|r| r.target.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3", "4", "5", "6", "7", "8"]);
    }

    #[test]
    fn test_valid_application() {
        let app = validate_scored_application(&application_record(5, 0.72)).unwrap();
        assert_eq!(app.application_id, "5");
        assert_eq!(app.matching_score, 0.72);
        assert_eq!(app.state, ApplicationState::Pending);
        assert_eq!(
            app.applied_at,
            NaiveDate::from_ymd_opt(2024, 3, 1).and_then(|d| d.and_hms_opt(9, 30, 0))
        );
        assert_eq!(app.candidate["prenom"], "Sami");
        assert!(app.job.is_some());
    }

    #[test]
    fn test_application_missing_state_defaults_to_pending() {
        let raw = json!({ "id": 1, "matchingScore": 0.3, "candidat": { "id": 2 }, "etat": null });
        let app = validate_scored_application(&raw).unwrap();
        assert_eq!(app.state, ApplicationState::Pending);
        assert!(app.applied_at.is_none());
    }

    #[test]
    fn test_application_unknown_state_is_rejected() {
        let mut raw = application_record(1, 0.3);
        raw["etat"] = json!("ARCHIVEE");
        assert!(validate_scored_application(&raw).is_none());
    }

    #[test]
    fn test_application_without_candidate_is_rejected() {
        let mut raw = application_record(1, 0.3);
        raw["candidat"] = Value::Null;
        assert!(validate_scored_application(&raw).is_none());
    }

    #[test]
    fn test_application_without_score_is_rejected() {
        let raw = json!({ "id": 1, "candidat": { "id": 2 } });
        assert!(validate_scored_application(&raw).is_none());
        assert!(filter_scored_applications(&[raw]).is_empty());
    }
}
