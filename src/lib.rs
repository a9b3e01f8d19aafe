//! Vitrine Algo - visibility scoring and partner matching service
//!
//! This library provides the core scoring and matching engine used by the
//! Vitrine marketing platform. It reduces a business's raw signals into a
//! single 0-100 visibility score, and proposes partner matches between
//! businesses based on score similarity and geography, excluding direct
//! competitors.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    distance::haversine_distance, matcher::Matcher, scoring::evaluate, ValidationError,
};
pub use crate::models::{
    BusinessSignals, Coordinates, Dimension, MatchCandidate, MatchResult, MatchStatus, MatchTier,
    ScoreRecord, ScoringWeights,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        // Verify that the library exports work correctly
        let weights = ScoringWeights::default();
        assert!((weights.sum() - 1.0).abs() < 1e-9);
    }
}
