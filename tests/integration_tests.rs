// Integration tests for Vitrine Algo

use chrono::Utc;
use vitrine_algo::core::{evaluate, filters::candidate, Matcher, ACCEPTANCE_THRESHOLD};
use vitrine_algo::models::{
    BusinessSignals, Coordinates, Dimension, MatchCandidate, MatchStatus, MatchTier, ScoreRecord,
    ScoringWeights,
};

fn make_signals(id: &str, sector: &str, lat: f64, lon: f64) -> BusinessSignals {
    BusinessSignals {
        business_id: id.to_string(),
        name: format!("Business {}", id),
        sector: sector.to_string(),
        city: "Montreal".to_string(),
        coordinates: Some(Coordinates {
            latitude: lat,
            longitude: lon,
        }),
        has_website: true,
        website_url: None,
        website_reachable: Some(true),
        has_listing_id: true,
        review_quality_signal: 50,
        market_position_signal: 50,
    }
}

fn make_score(id: &str, overall: u8) -> ScoreRecord {
    ScoreRecord {
        business_id: id.to_string(),
        evaluated_at: Utc::now(),
        seo: overall,
        content: overall,
        physical_presence: overall,
        reputation: overall,
        position: overall,
        overall,
        weakest_dimension: Dimension::Seo,
        recommended_action: String::new(),
        analysis: String::new(),
    }
}

fn make_candidate(id: &str, sector: &str, overall: u8, lat: f64, lon: f64) -> MatchCandidate {
    candidate(make_signals(id, sector, lat, lon), make_score(id, overall)).unwrap()
}

#[test]
fn test_ideal_pair_with_synergies() {
    // Restaurant (82) and caterer (78) roughly 3 km apart: ideal tier,
    // delta 4, compatibility 91, proximity + complementary synergies
    let matcher = Matcher::new();
    let target = make_candidate("resto", "restaurant", 82, 45.5017, -73.5673);
    let partner = make_candidate("traiteur", "catering", 78, 45.5287, -73.5673);

    let report = matcher.find_partners(&target, &[partner], 10);

    assert_eq!(report.matches.len(), 1);
    let m = &report.matches[0];

    assert_eq!(m.tier, MatchTier::Ideal);
    assert_eq!(m.score_delta, 4);
    assert_eq!(m.compatibility, 91);
    assert!(m.distance_km > 2.5 && m.distance_km < 3.5);
    assert_eq!(m.status, MatchStatus::Pending);
    assert_eq!(
        m.synergies,
        vec!["favorable geographic proximity", "complementary sectors"]
    );
}

#[test]
fn test_competitors_never_matched_either_direction() {
    // Two bakeries 1.2 km apart produce zero results regardless of scores
    let matcher = Matcher::new();
    let a = make_candidate("bakery_a", "bakery", 95, 45.5000, -73.5600);
    let b = make_candidate("bakery_b", "bakery", 20, 45.5108, -73.5600);

    let forward = matcher.find_partners(&a, &[b.clone()], 10);
    let backward = matcher.find_partners(&b, &[a], 10);

    assert!(forward.matches.is_empty());
    assert!(backward.matches.is_empty());
}

#[test]
fn test_end_to_end_scoring_then_matching() {
    let weights = ScoringWeights::default();
    let matcher = Matcher::new();

    let target_signals = make_signals("resto", "restaurant", 45.5017, -73.5673);
    let partner_signals = make_signals("gym", "fitness", 45.5090, -73.5673);

    let target_score = evaluate(&target_signals, &weights).unwrap();
    let partner_score = evaluate(&partner_signals, &weights).unwrap();

    let target = candidate(target_signals, target_score).unwrap();
    let partner = candidate(partner_signals, partner_score).unwrap();

    let report = matcher.find_partners(&target, &[partner], 10);

    // Identical signals apart from sector: delta is 0 or near it, under
    // a kilometre apart -> an ideal pairing
    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].tier, MatchTier::Ideal);
    assert!(report.matches[0].compatibility >= 90);
}

#[test]
fn test_threshold_law_holds_for_mixed_pool() {
    let matcher = Matcher::new();
    let target = make_candidate("t", "restaurant", 75, 45.50, -73.56);

    let mut pool = Vec::new();
    // Mixed deltas and distances, no competitors
    for i in 0..30u8 {
        pool.push(make_candidate(
            &format!("c{}", i),
            "florist",
            40 + 2 * i,
            45.50 + (i as f64) * 0.004,
            -73.56,
        ));
    }

    let report = matcher.find_partners(&target, &pool, 100);

    assert!(!report.matches.is_empty());
    assert!(report.matches.len() < pool.len());
    for m in &report.matches {
        assert!(m.compatibility >= ACCEPTANCE_THRESHOLD);
    }
}

#[test]
fn test_tier_consistency() {
    let matcher = Matcher::new();
    let target = make_candidate("t", "restaurant", 75, 45.50, -73.56);

    let pool = vec![
        make_candidate("near_close", "florist", 72, 45.51, -73.56),
        make_candidate("near_far", "retail", 72, 45.57, -73.56),
        make_candidate("mid_mid", "fitness", 60, 45.55, -73.56),
        make_candidate("same_far", "catering", 75, 45.70, -73.56),
    ];

    let report = matcher.find_partners(&target, &pool, 100);

    for m in &report.matches {
        match m.tier {
            MatchTier::Ideal => {
                assert!(m.score_delta <= 10);
                assert!(m.distance_km <= 5.0);
            }
            MatchTier::Compensated => {
                assert!(m.score_delta <= 20);
                assert!(m.distance_km <= 10.0);
                // and not within the ideal bounds
                assert!(m.score_delta > 10 || m.distance_km > 5.0);
            }
            MatchTier::NotRecommended => {
                assert!(m.score_delta > 20 || m.distance_km > 10.0);
            }
        }
    }
}

#[test]
fn test_not_recommended_pair_survives_at_zero_delta() {
    // Equal scores far apart: not_recommended but exactly at threshold
    let matcher = Matcher::new();
    let target = make_candidate("t", "restaurant", 75, 45.50, -73.56);
    let distant = make_candidate("d", "florist", 75, 45.70, -73.56);

    let report = matcher.find_partners(&target, &[distant], 10);

    assert_eq!(report.matches.len(), 1);
    assert_eq!(report.matches[0].tier, MatchTier::NotRecommended);
    assert_eq!(report.matches[0].compatibility, 60);
}

#[test]
fn test_results_ordered_by_compatibility_then_distance() {
    let matcher = Matcher::new();
    let target = make_candidate("t", "restaurant", 80, 45.5000, -73.5600);

    let pool = vec![
        make_candidate("c1", "florist", 62, 45.5050, -73.5600),
        make_candidate("c2", "retail", 78, 45.5050, -73.5600),
        make_candidate("c3", "fitness", 80, 45.5300, -73.5600),
        make_candidate("c4", "catering", 74, 45.5100, -73.5600),
        make_candidate("c5", "nutrition", 78, 45.5250, -73.5600),
    ];

    let report = matcher.find_partners(&target, &pool, 100);

    for pair in report.matches.windows(2) {
        assert!(pair[0].compatibility >= pair[1].compatibility);
        if pair[0].compatibility == pair[1].compatibility {
            assert!(pair[0].distance_km <= pair[1].distance_km);
        }
    }
}

#[test]
fn test_symmetric_invocations_agree() {
    let matcher = Matcher::new();
    let a = make_candidate("a", "restaurant", 82, 45.5000, -73.5600);
    let b = make_candidate("b", "catering", 78, 45.5270, -73.5600);

    let forward = matcher.find_partners(&a, &[b.clone()], 10);
    let backward = matcher.find_partners(&b, &[a], 10);

    assert_eq!(forward.matches.len(), 1);
    assert_eq!(backward.matches.len(), 1);

    let f = &forward.matches[0];
    let r = &backward.matches[0];
    assert_eq!(f.tier, r.tier);
    assert_eq!(f.compatibility, r.compatibility);
    assert_eq!(f.score_delta, r.score_delta);
    assert!((f.distance_km - r.distance_km).abs() < 1e-9);
    assert_eq!(f.synergies, r.synergies);
}

#[test]
fn test_empty_pool_yields_empty_list() {
    let matcher = Matcher::new();
    let target = make_candidate("t", "restaurant", 80, 45.50, -73.56);

    let report = matcher.find_partners(&target, &[], 10);

    assert!(report.matches.is_empty());
    assert_eq!(report.total_candidates, 0);
}

#[test]
fn test_high_performance_duo_synergy() {
    let matcher = Matcher::new();
    let target = make_candidate("t", "restaurant", 88, 45.5000, -73.5600);
    let partner = make_candidate("p", "florist", 84, 45.5020, -73.5600);

    let report = matcher.find_partners(&target, &[partner], 10);

    assert_eq!(report.matches.len(), 1);
    assert!(report.matches[0]
        .synergies
        .iter()
        .any(|s| s == "high-performance duo"));
}
