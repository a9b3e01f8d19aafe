// Unit tests for Vitrine Algo

use vitrine_algo::core::{
    distance::{calculate_bounding_box, haversine_distance, is_within_bounding_box},
    filters::{are_complementary_sectors, validate_signals},
    scoring::evaluate,
};
use vitrine_algo::models::{BusinessSignals, Coordinates, Dimension, ScoringWeights};

fn make_signals(id: &str) -> BusinessSignals {
    BusinessSignals {
        business_id: id.to_string(),
        name: format!("Business {}", id),
        sector: "restaurant".to_string(),
        city: "Montreal".to_string(),
        coordinates: Some(Coordinates {
            latitude: 45.5017,
            longitude: -73.5673,
        }),
        has_website: true,
        website_url: Some("https://example.test".to_string()),
        website_reachable: Some(true),
        has_listing_id: true,
        review_quality_signal: 20,
        market_position_signal: 20,
    }
}

#[test]
fn test_haversine_distance_zero() {
    let montreal = Coordinates {
        latitude: 45.5017,
        longitude: -73.5673,
    };
    let distance = haversine_distance(montreal, montreal);
    assert!(distance < 0.01);
}

#[test]
fn test_haversine_distance_known_pair() {
    // Montreal to Quebec City is approximately 233 km
    let montreal = Coordinates {
        latitude: 45.5017,
        longitude: -73.5673,
    };
    let quebec = Coordinates {
        latitude: 46.8139,
        longitude: -71.2080,
    };

    let distance = haversine_distance(montreal, quebec);
    assert!(distance > 220.0 && distance < 250.0);
}

#[test]
fn test_bounding_box_creation() {
    let center = Coordinates {
        latitude: 45.5017,
        longitude: -73.5673,
    };
    let bbox = calculate_bounding_box(center, 10.0);

    assert!(bbox.min_lat < center.latitude);
    assert!(bbox.max_lat > center.latitude);
    assert!(bbox.min_lon < center.longitude);
    assert!(bbox.max_lon > center.longitude);

    // Bounding box should be roughly 0.18 degrees in latitude (20km / 111km per degree)
    let lat_span = bbox.max_lat - bbox.min_lat;
    assert!((lat_span - 0.18).abs() < 0.02);
}

#[test]
fn test_point_within_bbox() {
    let center = Coordinates {
        latitude: 45.5017,
        longitude: -73.5673,
    };
    let bbox = calculate_bounding_box(center, 10.0);

    assert!(is_within_bounding_box(center, &bbox));
    assert!(!is_within_bounding_box(
        Coordinates {
            latitude: 46.8,
            longitude: -71.2,
        },
        &bbox
    ));
}

#[test]
fn test_validate_signals_pass() {
    assert!(validate_signals(&make_signals("b1")).is_ok());
}

#[test]
fn test_validate_signals_rejects_empty_id() {
    let mut signals = make_signals("b1");
    signals.business_id = String::new();

    assert!(validate_signals(&signals).is_err());
}

#[test]
fn test_validate_signals_rejects_invalid_latitude() {
    let mut signals = make_signals("b1");
    signals.coordinates = Some(Coordinates {
        latitude: 123.0,
        longitude: -73.5,
    });

    assert!(validate_signals(&signals).is_err());
}

#[test]
fn test_validate_allows_missing_coordinates_for_scoring() {
    // An ungeocoded business can still be scored; it just cannot be matched
    let mut signals = make_signals("b1");
    signals.coordinates = None;

    assert!(validate_signals(&signals).is_ok());
    assert!(evaluate(&signals, &ScoringWeights::default()).is_ok());
    assert!(!signals.is_complete());
}

#[test]
fn test_weights_sum_exactly_one() {
    let weights = ScoringWeights::default();
    assert!((weights.sum() - 1.0).abs() < f64::EPSILON);
}

#[test]
fn test_overall_within_bounds_across_signal_grid() {
    let weights = ScoringWeights::default();

    for has_website in [false, true] {
        for reachable in [None, Some(false), Some(true)] {
            for has_listing in [false, true] {
                for signal in [0u8, 50, 100] {
                    let mut signals = make_signals("grid");
                    signals.has_website = has_website;
                    signals.website_reachable = reachable;
                    signals.has_listing_id = has_listing;
                    signals.review_quality_signal = signal;
                    signals.market_position_signal = signal;

                    let record = evaluate(&signals, &weights).unwrap();
                    assert!(record.overall <= 100);
                    assert!(record.seo <= 100);
                    assert!(record.content <= 100);
                    assert!(record.physical_presence <= 100);
                    assert!(record.reputation <= 100);
                    assert!(record.position <= 100);
                }
            }
        }
    }
}

#[test]
fn test_evaluate_is_deterministic() {
    let signals = make_signals("b1");
    let weights = ScoringWeights::default();

    let a = evaluate(&signals, &weights).unwrap();
    let b = evaluate(&signals, &weights).unwrap();

    // Bit-identical apart from the evaluation timestamp
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
fn test_regression_fixture_full_signals() {
    let signals = BusinessSignals {
        business_id: "fixture".to_string(),
        name: "Fixture".to_string(),
        sector: "services".to_string(),
        city: "Laval".to_string(),
        coordinates: Some(Coordinates {
            latitude: 45.58,
            longitude: -73.71,
        }),
        has_website: true,
        website_url: None,
        website_reachable: Some(true),
        has_listing_id: true,
        review_quality_signal: 20,
        market_position_signal: 20,
    };

    let record = evaluate(&signals, &ScoringWeights::default()).unwrap();

    assert_eq!(record.seo, 100);
    assert_eq!(record.content, 100);
    assert_eq!(record.physical_presence, 100);
    assert_eq!(record.reputation, 95);
    assert_eq!(record.position, 95);
    assert_eq!(record.overall, 98);
}

#[test]
fn test_weakest_dimension_reported() {
    let mut signals = make_signals("b1");
    // No listing: physical presence drops to 60, reputation to 65
    signals.has_listing_id = false;
    signals.review_quality_signal = 20;
    signals.market_position_signal = 20;

    let record = evaluate(&signals, &ScoringWeights::default()).unwrap();
    assert_eq!(record.weakest_dimension, Dimension::PhysicalPresence);
    assert!(record.analysis.contains("physical presence"));
}

#[test]
fn test_recommendation_band_boundaries() {
    // Fully dark business: no website, no listing, no signals, minor market
    let signals = BusinessSignals {
        business_id: "dark".to_string(),
        name: "Dark".to_string(),
        sector: "florist".to_string(),
        city: "Alma".to_string(),
        coordinates: None,
        has_website: false,
        website_url: None,
        website_reachable: None,
        has_listing_id: false,
        review_quality_signal: 0,
        market_position_signal: 0,
    };

    let record = evaluate(&signals, &ScoringWeights::default()).unwrap();
    // seo 50, content 40, physical 60, reputation 45, position 50 -> 48.75 -> 49
    assert_eq!(record.overall, 49);
    assert_eq!(record.recommended_action, "urgent visibility strategy");
    assert_eq!(record.weakest_dimension, Dimension::Content);
}

#[test]
fn test_complementary_sector_table() {
    assert!(are_complementary_sectors("restaurant", "catering"));
    assert!(are_complementary_sectors("Hairdresser", "Esthetics"));
    assert!(are_complementary_sectors("real estate", "interior design"));
    assert!(!are_complementary_sectors("bakery", "bakery"));
}
