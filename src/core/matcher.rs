use chrono::Utc;

use crate::core::distance::haversine_distance;
use crate::core::filters::{detect_synergies, is_direct_competitor};
use crate::models::{MatchCandidate, MatchResult, MatchStatus, MatchTier};

/// Minimum compatibility a pair must reach to be returned at all. Pairs
/// below the threshold are omitted, never returned with a low score.
pub const ACCEPTANCE_THRESHOLD: u8 = 60;

/// Ideal tier bounds
const IDEAL_MAX_DELTA: u8 = 10;
const IDEAL_MAX_DISTANCE_KM: f64 = 5.0;

/// Compensated tier bounds
const COMPENSATED_MAX_DELTA: u8 = 20;
const COMPENSATED_MAX_DISTANCE_KM: f64 = 10.0;

/// Compatibility floor for pairs outside both tiers
const NOT_RECOMMENDED_FLOOR: u8 = 30;

/// Outcome of one matching run
#[derive(Debug)]
pub struct MatchReport {
    pub matches: Vec<MatchResult>,
    pub total_candidates: usize,
    pub excluded_competitors: usize,
}

/// Partner matching engine
///
/// Pure and synchronous: given a target and a candidate pool it excludes
/// direct competitors, classifies every remaining pair into a tier, attaches
/// synergy tags, and returns a ranked list. The per-candidate loop has no
/// shared state, so results are deterministic regardless of pool order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher;

impl Matcher {
    pub fn new() -> Self {
        Self
    }

    /// Find partner matches for a target business
    ///
    /// # Arguments
    /// * `target` - The business looking for partners
    /// * `pool` - Candidate businesses (built through `filters::eligible_pool`)
    /// * `limit` - Maximum number of matches to return
    ///
    /// Results are ordered by compatibility descending, then distance
    /// ascending, then candidate id, so the ranking is a total order.
    pub fn find_partners(
        &self,
        target: &MatchCandidate,
        pool: &[MatchCandidate],
        limit: usize,
    ) -> MatchReport {
        let total_candidates = pool.len();
        let mut excluded_competitors = 0;
        let mut matches: Vec<MatchResult> = Vec::new();

        for other in pool {
            if other.signals.business_id == target.signals.business_id {
                continue;
            }

            if is_direct_competitor(target, other) {
                excluded_competitors += 1;
                continue;
            }

            let distance_km = haversine_distance(target.coordinates, other.coordinates);
            let score_delta = target.score.overall.abs_diff(other.score.overall);

            let (tier, compatibility) = classify(score_delta, distance_km);

            if compatibility < ACCEPTANCE_THRESHOLD {
                continue;
            }

            let synergies = detect_synergies(target, other, distance_km);

            matches.push(MatchResult {
                target_id: target.signals.business_id.clone(),
                candidate_id: other.signals.business_id.clone(),
                tier,
                compatibility,
                score_delta,
                distance_km,
                synergies,
                created_at: Utc::now(),
                status: MatchStatus::Pending,
            });
        }

        matches.sort_by(|a, b| {
            b.compatibility
                .cmp(&a.compatibility)
                .then_with(|| {
                    a.distance_km
                        .partial_cmp(&b.distance_km)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.candidate_id.cmp(&b.candidate_id))
        });

        matches.truncate(limit);

        MatchReport {
            matches,
            total_candidates,
            excluded_competitors,
        }
    }
}

/// Tier classification, first matching rule wins
fn classify(score_delta: u8, distance_km: f64) -> (MatchTier, u8) {
    if score_delta <= IDEAL_MAX_DELTA && distance_km <= IDEAL_MAX_DISTANCE_KM {
        (MatchTier::Ideal, 95 - score_delta)
    } else if score_delta <= COMPENSATED_MAX_DELTA && distance_km <= COMPENSATED_MAX_DISTANCE_KM {
        (MatchTier::Compensated, 80 - score_delta)
    } else {
        let compatibility = (60 - score_delta as i32).max(NOT_RECOMMENDED_FLOOR as i32) as u8;
        (MatchTier::NotRecommended, compatibility)
    }
}
