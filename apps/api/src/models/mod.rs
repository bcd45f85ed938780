pub mod application;
pub mod recommendation;

pub use application::{ApplicationState, ScoredApplication};
pub use recommendation::{JobPosting, Recommendation};
