// Core algorithm exports
pub mod distance;
pub mod filters;
pub mod matcher;
pub mod scoring;

pub use distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box};
pub use filters::{
    are_complementary_sectors, candidate, detect_synergies, eligible_pool, is_direct_competitor,
    validate_signals, ValidationError, COMPETITOR_RADIUS_KM,
};
pub use matcher::{MatchReport, Matcher, ACCEPTANCE_THRESHOLD};
pub use scoring::evaluate;
