//! Display helpers for matching scores. Total functions: invalid input
//! degrades to `0%` / `Poor` instead of failing.

use serde::Serialize;

/// Coarse match quality bands used by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchClass {
    Excellent,
    Good,
    Average,
    Poor,
}

impl MatchClass {
    pub fn description(self) -> &'static str {
        match self {
            MatchClass::Excellent => "Excellent match",
            MatchClass::Good => "Good match",
            MatchClass::Average => "Average match",
            MatchClass::Poor => "Weak match",
        }
    }
}

fn in_range(score: f64) -> bool {
    score.is_finite() && (0.0..=1.0).contains(&score)
}

/// `0.853` → `"85%"`. Anything outside `[0, 1]` (or NaN) renders as `"0%"`.
pub fn format_score(score: f64) -> String {
    if !in_range(score) {
        return "0%".to_string();
    }
    format!("{}%", (score * 100.0).round() as u32)
}

/// Thresholds are inclusive lower bounds: 0.8, 0.6, 0.4.
pub fn classify(score: f64) -> MatchClass {
    if !in_range(score) {
        return MatchClass::Poor;
    }
    if score >= 0.8 {
        MatchClass::Excellent
    } else if score >= 0.6 {
        MatchClass::Good
    } else if score >= 0.4 {
        MatchClass::Average
    } else {
        MatchClass::Poor
    }
}
