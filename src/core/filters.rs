use thiserror::Error;

use crate::core::distance::haversine_distance;
use crate::models::{BusinessSignals, MatchCandidate, ScoreRecord};

/// Radius under which two businesses in the same sector are direct
/// competitors and must never be proposed to each other.
pub const COMPETITOR_RADIUS_KM: f64 = 2.0;

/// Distance under which a pair earns the geographic proximity synergy
const PROXIMITY_SYNERGY_KM: f64 = 5.0;

/// Mean overall score above which a pair earns the high-performance synergy
const HIGH_PERFORMANCE_MEAN: f64 = 80.0;

/// Sector pairs considered complementary. Matching is symmetric and
/// case-insensitive; a sector is never complementary with itself.
const COMPLEMENTARY_SECTORS: [(&str, &str); 5] = [
    ("restaurant", "catering"),
    ("hairdresser", "esthetics"),
    ("fitness", "nutrition"),
    ("real estate", "interior design"),
    ("automotive", "insurance"),
];

/// Errors raised when a single business or pair is rejected. Batch callers
/// report these per item and keep going.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("business {business_id}: missing required field '{field}'")]
    MissingField {
        business_id: String,
        field: &'static str,
    },

    #[error("business {business_id}: {field} out of range (got {value}, expected 0-100)")]
    SignalOutOfRange {
        business_id: String,
        field: &'static str,
        value: u8,
    },

    #[error("business {business_id}: invalid coordinates ({latitude}, {longitude})")]
    InvalidCoordinates {
        business_id: String,
        latitude: f64,
        longitude: f64,
    },

    #[error("business {business_id}: not geocoded, cannot be matched")]
    MissingCoordinates { business_id: String },

    #[error("business {business_id}: no current score record")]
    MissingScore { business_id: String },

    #[error("score record for {score_business_id} does not belong to business {business_id}")]
    ScoreMismatch {
        business_id: String,
        score_business_id: String,
    },
}

/// Validate raw signals before scoring. Never coerces: an out-of-range
/// value rejects the item rather than being clamped into a plausible score.
pub fn validate_signals(signals: &BusinessSignals) -> Result<(), ValidationError> {
    if signals.business_id.trim().is_empty() {
        return Err(ValidationError::MissingField {
            business_id: signals.business_id.clone(),
            field: "businessId",
        });
    }

    if signals.sector.trim().is_empty() {
        return Err(ValidationError::MissingField {
            business_id: signals.business_id.clone(),
            field: "sector",
        });
    }

    if signals.review_quality_signal > 100 {
        return Err(ValidationError::SignalOutOfRange {
            business_id: signals.business_id.clone(),
            field: "reviewQualitySignal",
            value: signals.review_quality_signal,
        });
    }

    if signals.market_position_signal > 100 {
        return Err(ValidationError::SignalOutOfRange {
            business_id: signals.business_id.clone(),
            field: "marketPositionSignal",
            value: signals.market_position_signal,
        });
    }

    if let Some(coords) = &signals.coordinates {
        if !coords.is_valid() {
            return Err(ValidationError::InvalidCoordinates {
                business_id: signals.business_id.clone(),
                latitude: coords.latitude,
                longitude: coords.longitude,
            });
        }
    }

    Ok(())
}

/// Build a match candidate from signals and their latest score record.
/// Fails when the business is ungeocoded or the score belongs to someone
/// else; matching prerequisites are never silently defaulted.
pub fn candidate(
    signals: BusinessSignals,
    score: ScoreRecord,
) -> Result<MatchCandidate, ValidationError> {
    validate_signals(&signals)?;

    if score.business_id != signals.business_id {
        return Err(ValidationError::ScoreMismatch {
            business_id: signals.business_id,
            score_business_id: score.business_id,
        });
    }

    let coordinates = signals
        .coordinates
        .ok_or_else(|| ValidationError::MissingCoordinates {
            business_id: signals.business_id.clone(),
        })?;

    Ok(MatchCandidate {
        signals,
        score,
        coordinates,
    })
}

/// Build the eligible candidate pool, dropping entries that lack a score
/// record or coordinates. Each skip is logged; matching proceeds over the
/// remaining pool. Returns the pool and the number of entries skipped.
pub fn eligible_pool(
    entries: Vec<(BusinessSignals, Option<ScoreRecord>)>,
) -> (Vec<MatchCandidate>, usize) {
    let mut pool = Vec::with_capacity(entries.len());
    let mut skipped = 0;

    for (signals, score) in entries {
        let business_id = signals.business_id.clone();
        let score = match score {
            Some(s) => s,
            None => {
                tracing::warn!("excluding {} from pool: no current score record", business_id);
                skipped += 1;
                continue;
            }
        };

        match candidate(signals, score) {
            Ok(c) => pool.push(c),
            Err(e) => {
                tracing::warn!("excluding {} from pool: {}", business_id, e);
                skipped += 1;
            }
        }
    }

    (pool, skipped)
}

/// Direct competitor check: same sector within the exclusion radius.
/// Competitors are never returned, not even as `not_recommended`.
#[inline]
pub fn is_direct_competitor(target: &MatchCandidate, other: &MatchCandidate) -> bool {
    target.signals.normalized_sector() == other.signals.normalized_sector()
        && haversine_distance(target.coordinates, other.coordinates) < COMPETITOR_RADIUS_KM
}

/// Symmetric complementary-sector lookup
#[inline]
pub fn are_complementary_sectors(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();

    if a == b {
        return false;
    }

    COMPLEMENTARY_SECTORS
        .iter()
        .any(|(x, y)| (a == *x && b == *y) || (a == *y && b == *x))
}

/// Collect the synergy tags for a pair, in fixed order: proximity, then
/// combined performance, then sector complementarity.
pub fn detect_synergies(
    target: &MatchCandidate,
    other: &MatchCandidate,
    distance_km: f64,
) -> Vec<String> {
    let mut synergies = Vec::new();

    if distance_km < PROXIMITY_SYNERGY_KM {
        synergies.push("favorable geographic proximity".to_string());
    }

    let mean_overall = (target.score.overall as f64 + other.score.overall as f64) / 2.0;
    if mean_overall > HIGH_PERFORMANCE_MEAN {
        synergies.push("high-performance duo".to_string());
    }

    if are_complementary_sectors(&target.signals.sector, &other.signals.sector) {
        synergies.push("complementary sectors".to_string());
    }

    synergies
}
