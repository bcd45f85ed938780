//! Client-side filtering and ordering of scored applications for one job.

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Deserialize;

use crate::models::ScoredApplication;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "desc")]
    Descending,
    #[serde(alias = "asc")]
    Ascending,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "desc" | "descending" => Ok(SortDirection::Descending),
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

/// Keeps applications scoring at least `min_score` and orders them by score.
///
/// The sort is stable in both directions, so equal scores keep the order the
/// backend returned them in. The input is never touched.
pub fn rank_applications(
    applications: &[ScoredApplication],
    min_score: f64,
    direction: SortDirection,
) -> Vec<ScoredApplication> {
    let min_score = if min_score.is_finite() { min_score } else { 0.0 };

    let mut ranked: Vec<ScoredApplication> = applications
        .iter()
        .filter(|a| a.matching_score >= min_score)
        .cloned()
        .collect();

    ranked.sort_by(|a, b| {
        let ord = a
            .matching_score
            .partial_cmp(&b.matching_score)
            .unwrap_or(Ordering::Equal);
        match direction {
            SortDirection::Descending => ord.reverse(),
            SortDirection::Ascending => ord,
        }
    });

    ranked
}
