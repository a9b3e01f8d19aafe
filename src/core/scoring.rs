use chrono::Utc;

use crate::core::filters::{validate_signals, ValidationError};
use crate::models::{BusinessSignals, Dimension, ScoreRecord, ScoringWeights};

/// Sectors that naturally sustain a content marketing presence
const CONTENT_RICH_SECTORS: [&str; 3] = ["restaurant", "retail", "services"];

/// Localities where local-search competition is strongest. Accented and
/// unaccented spellings both occur in CRM data.
const MAJOR_MARKETS: [&str; 8] = [
    "montreal",
    "montréal",
    "laval",
    "quebec",
    "québec",
    "gatineau",
    "longueuil",
    "sherbrooke",
];

/// Evaluate a business's visibility: five sub-scores, the weighted
/// aggregate, the weakest dimension, and the recommendation derived from
/// both.
///
/// Pure over its inputs plus the fixed tables above. All I/O (reachability
/// probe, listing and review lookups) happens before this call; an absent
/// signal simply forfeits its bonus.
pub fn evaluate(
    signals: &BusinessSignals,
    weights: &ScoringWeights,
) -> Result<ScoreRecord, ValidationError> {
    validate_signals(signals)?;

    let seo = seo_score(signals);
    let content = content_score(signals);
    let physical_presence = physical_presence_score(signals);
    let reputation = reputation_score(signals);
    let position = position_score(signals);

    let overall = aggregate(
        [seo, content, physical_presence, reputation, position],
        weights,
    );

    let weakest_dimension = weakest_dimension([seo, content, physical_presence, reputation, position]);
    let (recommended_action, analysis) = recommend(overall, weakest_dimension);

    Ok(ScoreRecord {
        business_id: signals.business_id.clone(),
        evaluated_at: Utc::now(),
        seo,
        content,
        physical_presence,
        reputation,
        position,
        overall,
        weakest_dimension,
        recommended_action,
        analysis,
    })
}

/// SEO sub-score: having a website matters most; the reachability probe
/// only gates the smaller bonus.
#[inline]
fn seo_score(signals: &BusinessSignals) -> u8 {
    let mut score: i32 = 50;
    if signals.has_website {
        score += 30;
    }
    if signals.website_reachable == Some(true) {
        score += 20;
    }
    clamp_score(score)
}

/// Content sub-score: a website to publish on, plus a sector bonus for
/// businesses with naturally content-rich offerings.
#[inline]
fn content_score(signals: &BusinessSignals) -> u8 {
    let mut score: i32 = 40;
    if signals.has_website {
        score += 35;
    }
    let sector = signals.normalized_sector();
    if CONTENT_RICH_SECTORS.contains(&sector.as_str()) {
        score += 25;
    }
    clamp_score(score)
}

/// Physical presence sub-score: driven by the directory listing
#[inline]
fn physical_presence_score(signals: &BusinessSignals) -> u8 {
    let mut score: i32 = 60;
    if signals.has_listing_id {
        score += 40;
    }
    clamp_score(score)
}

/// Reputation sub-score: listing bonus plus the externally supplied
/// review-quality contribution.
#[inline]
fn reputation_score(signals: &BusinessSignals) -> u8 {
    let mut score: i32 = 45;
    if signals.has_listing_id {
        score += 30;
    }
    score += signals.review_quality_signal as i32;
    clamp_score(score)
}

/// Market position sub-score: major-market bonus plus the externally
/// supplied ranking-strength contribution.
#[inline]
fn position_score(signals: &BusinessSignals) -> u8 {
    let mut score: i32 = 50;
    let city = signals.city.trim().to_lowercase();
    if MAJOR_MARKETS.contains(&city.as_str()) {
        score += 25;
    }
    score += signals.market_position_signal as i32;
    clamp_score(score)
}

#[inline]
fn clamp_score(raw: i32) -> u8 {
    raw.clamp(0, 100) as u8
}

/// Weighted aggregate of the five sub-scores, rounded to the nearest
/// integer. With weights summing to 1.0 and sub-scores in [0,100] the
/// result is always in [0,100]; the clamp guards rounding at the edges.
fn aggregate(sub_scores: [u8; 5], weights: &ScoringWeights) -> u8 {
    let [seo, content, physical, reputation, position] = sub_scores;

    let weighted = seo as f64 * weights.seo
        + content as f64 * weights.content
        + physical as f64 * weights.physical_presence
        + reputation as f64 * weights.reputation
        + position as f64 * weights.position;

    weighted.round().clamp(0.0, 100.0) as u8
}

/// Lowest sub-score wins; ties resolve to the first dimension in the
/// fixed order seo, content, physicalPresence, reputation, position.
fn weakest_dimension(sub_scores: [u8; 5]) -> Dimension {
    let ordered = [
        (Dimension::Seo, sub_scores[0]),
        (Dimension::Content, sub_scores[1]),
        (Dimension::PhysicalPresence, sub_scores[2]),
        (Dimension::Reputation, sub_scores[3]),
        (Dimension::Position, sub_scores[4]),
    ];

    let mut weakest = ordered[0];
    for entry in &ordered[1..] {
        if entry.1 < weakest.1 {
            weakest = *entry;
        }
    }
    weakest.0
}

/// Deterministic recommendation derived from the aggregate band and the
/// weakest dimension.
fn recommend(overall: u8, weakest: Dimension) -> (String, String) {
    if overall >= 80 {
        (
            "advanced optimization and expansion".to_string(),
            format!(
                "Visibility is strong across all channels; consolidate {} and look at expansion opportunities.",
                weakest.label()
            ),
        )
    } else if overall >= 60 {
        (
            "targeted improvement".to_string(),
            format!(
                "Overall visibility is solid; {} is the weakest dimension and should be the next priority.",
                weakest.label()
            ),
        )
    } else {
        (
            "urgent visibility strategy".to_string(),
            format!(
                "Overall visibility is low; {} requires immediate action.",
                weakest.label()
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Coordinates;

    fn base_signals() -> BusinessSignals {
        BusinessSignals {
            business_id: "biz_1".to_string(),
            name: "Chez Test".to_string(),
            sector: "florist".to_string(),
            city: "Trois-Rivieres".to_string(),
            coordinates: Some(Coordinates {
                latitude: 46.35,
                longitude: -72.55,
            }),
            has_website: false,
            website_url: None,
            website_reachable: None,
            has_listing_id: false,
            review_quality_signal: 0,
            market_position_signal: 0,
        }
    }

    #[test]
    fn test_seo_score_bonuses() {
        let mut s = base_signals();
        assert_eq!(seo_score(&s), 50);

        s.has_website = true;
        assert_eq!(seo_score(&s), 80);

        s.website_reachable = Some(true);
        assert_eq!(seo_score(&s), 100);

        // A failed probe denies the bonus, it is not an error
        s.website_reachable = Some(false);
        assert_eq!(seo_score(&s), 80);
    }

    #[test]
    fn test_content_score_sector_case_insensitive() {
        let mut s = base_signals();
        s.has_website = true;
        assert_eq!(content_score(&s), 75);

        s.sector = "Restaurant".to_string();
        assert_eq!(content_score(&s), 100);

        s.sector = "  SERVICES ".to_string();
        assert_eq!(content_score(&s), 100);
    }

    #[test]
    fn test_physical_presence_score() {
        let mut s = base_signals();
        assert_eq!(physical_presence_score(&s), 60);

        s.has_listing_id = true;
        assert_eq!(physical_presence_score(&s), 100);
    }

    #[test]
    fn test_reputation_score_clamped() {
        let mut s = base_signals();
        s.has_listing_id = true;
        s.review_quality_signal = 100;

        // 45 + 30 + 100 saturates at 100
        assert_eq!(reputation_score(&s), 100);
    }

    #[test]
    fn test_position_score_major_market() {
        let mut s = base_signals();
        s.market_position_signal = 10;
        assert_eq!(position_score(&s), 60);

        s.city = "Montréal".to_string();
        assert_eq!(position_score(&s), 85);

        s.city = "LAVAL".to_string();
        assert_eq!(position_score(&s), 85);
    }

    #[test]
    fn test_weakest_dimension_tie_breaks_to_first() {
        assert_eq!(weakest_dimension([70, 70, 70, 70, 70]), Dimension::Seo);
        assert_eq!(weakest_dimension([80, 60, 60, 90, 90]), Dimension::Content);
        assert_eq!(weakest_dimension([80, 70, 60, 60, 90]), Dimension::PhysicalPresence);
    }

    #[test]
    fn test_recommendation_bands() {
        let (action, _) = recommend(80, Dimension::Seo);
        assert_eq!(action, "advanced optimization and expansion");

        let (action, analysis) = recommend(79, Dimension::Reputation);
        assert_eq!(action, "targeted improvement");
        assert!(analysis.contains("reputation"));

        let (action, analysis) = recommend(59, Dimension::Content);
        assert_eq!(action, "urgent visibility strategy");
        assert!(analysis.contains("immediate action"));
    }

    #[test]
    fn test_evaluate_regression_fixture() {
        // Hand-computed reference: seo 100, content 100, physical 100,
        // reputation 95, position 95 -> overall 98
        let s = BusinessSignals {
            business_id: "fixture".to_string(),
            name: "Fixture".to_string(),
            sector: "services".to_string(),
            city: "Laval".to_string(),
            coordinates: Some(Coordinates {
                latitude: 45.58,
                longitude: -73.71,
            }),
            has_website: true,
            website_url: Some("https://fixture.example".to_string()),
            website_reachable: Some(true),
            has_listing_id: true,
            review_quality_signal: 20,
            market_position_signal: 20,
        };

        let record = evaluate(&s, &ScoringWeights::default()).unwrap();

        assert_eq!(record.seo, 100);
        assert_eq!(record.content, 100);
        assert_eq!(record.physical_presence, 100);
        assert_eq!(record.reputation, 95);
        assert_eq!(record.position, 95);
        assert_eq!(record.overall, 98);
        assert_eq!(record.weakest_dimension, Dimension::Reputation);
        assert_eq!(record.recommended_action, "advanced optimization and expansion");
    }

    #[test]
    fn test_evaluate_deterministic() {
        let s = base_signals();
        let weights = ScoringWeights::default();

        let a = evaluate(&s, &weights).unwrap();
        let b = evaluate(&s, &weights).unwrap();

        assert_eq!(a.seo, b.seo);
        assert_eq!(a.content, b.content);
        assert_eq!(a.physical_presence, b.physical_presence);
        assert_eq!(a.reputation, b.reputation);
        assert_eq!(a.position, b.position);
        assert_eq!(a.overall, b.overall);
        assert_eq!(a.weakest_dimension, b.weakest_dimension);
        assert_eq!(a.recommended_action, b.recommended_action);
        assert_eq!(a.analysis, b.analysis);
    }

    #[test]
    fn test_evaluate_rejects_invalid_input() {
        let mut s = base_signals();
        s.market_position_signal = 101;

        assert!(evaluate(&s, &ScoringWeights::default()).is_err());
    }

    #[test]
    fn test_weights_sum_to_one() {
        let weights = ScoringWeights::default();
        assert!((weights.sum() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_overall_bounded_for_extreme_sub_scores() {
        let weights = ScoringWeights::default();
        assert_eq!(aggregate([0, 0, 0, 0, 0], &weights), 0);
        assert_eq!(aggregate([100, 100, 100, 100, 100], &weights), 100);
    }
}
