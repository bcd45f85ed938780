// Recommendation access layer: cache, facade, validation, display and ranking.
// All backend calls go through scoring_client, never reqwest directly.

pub mod cache;
pub mod display;
pub mod handlers;
pub mod ranking;
pub mod service;
pub mod validation;
