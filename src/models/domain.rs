use serde::{Deserialize, Serialize};

/// Geographic position of a business, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Check that both components are finite and within WGS84 bounds
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Raw visibility signals for one business, assembled upstream by the CRM
/// and ingestion collaborators. The scoring engine never fetches anything
/// itself: reachability probes and review/ranking lookups happen before a
/// record reaches `evaluate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSignals {
    #[serde(rename = "businessId")]
    pub business_id: String,
    pub name: String,
    pub sector: String,
    pub city: String,
    /// Absent until the business has been geocoded
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(rename = "hasWebsite", default)]
    pub has_website: bool,
    #[serde(rename = "websiteUrl", default)]
    pub website_url: Option<String>,
    /// `None` means the liveness probe has not run (or its result is unknown)
    #[serde(rename = "websiteReachable", default)]
    pub website_reachable: Option<bool>,
    #[serde(rename = "hasListingId", default)]
    pub has_listing_id: bool,
    /// External review-quality proxy, 0-100
    #[serde(rename = "reviewQualitySignal", default)]
    pub review_quality_signal: u8,
    /// External local-search ranking proxy, 0-100
    #[serde(rename = "marketPositionSignal", default)]
    pub market_position_signal: u8,
}

impl BusinessSignals {
    /// Sector name normalized for comparison (trimmed, lowercased)
    pub fn normalized_sector(&self) -> String {
        self.sector.trim().to_lowercase()
    }

    /// True when every signal the engine consumes is actually known.
    /// An incomplete business still scores; the CRM surfaces the flag
    /// instead of an error page.
    pub fn is_complete(&self) -> bool {
        self.coordinates.is_some() && (!self.has_website || self.website_reachable.is_some())
    }
}

/// The five scored dimensions, in the fixed tie-break order used when
/// diagnosing the weakest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Seo,
    Content,
    PhysicalPresence,
    Reputation,
    Position,
}

impl Dimension {
    /// Human-readable label used in recommendation text
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Seo => "SEO",
            Dimension::Content => "content",
            Dimension::PhysicalPresence => "physical presence",
            Dimension::Reputation => "reputation",
            Dimension::Position => "market position",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Seo => "seo",
            Dimension::Content => "content",
            Dimension::PhysicalPresence => "physicalPresence",
            Dimension::Reputation => "reputation",
            Dimension::Position => "position",
        }
    }
}

impl std::str::FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seo" => Ok(Dimension::Seo),
            "content" => Ok(Dimension::Content),
            "physicalPresence" => Ok(Dimension::PhysicalPresence),
            "reputation" => Ok(Dimension::Reputation),
            "position" => Ok(Dimension::Position),
            other => Err(format!("unknown dimension: {}", other)),
        }
    }
}

/// One evaluation of a business. Records are immutable once produced;
/// re-evaluating a business appends a new record rather than mutating an
/// old one, so score history stays auditable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    #[serde(rename = "businessId")]
    pub business_id: String,
    #[serde(rename = "evaluatedAt")]
    pub evaluated_at: chrono::DateTime<chrono::Utc>,
    pub seo: u8,
    pub content: u8,
    #[serde(rename = "physicalPresence")]
    pub physical_presence: u8,
    pub reputation: u8,
    pub position: u8,
    pub overall: u8,
    #[serde(rename = "weakestDimension")]
    pub weakest_dimension: Dimension,
    #[serde(rename = "recommendedAction")]
    pub recommended_action: String,
    pub analysis: String,
}

/// A business eligible for matching: signals plus its latest score record,
/// with coordinates guaranteed present. Built through
/// `core::filters::candidate`, which rejects ungeocoded or unscored input.
#[derive(Debug, Clone)]
pub struct MatchCandidate {
    pub signals: BusinessSignals,
    pub score: ScoreRecord,
    pub coordinates: Coordinates,
}

/// Partner-match tier assigned by the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Ideal,
    Compensated,
    NotRecommended,
}

/// Lifecycle state of a stored match. The matcher only ever produces
/// `Pending`; the CRM moves a match to one of the terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
}

/// One proposed partnership, directional (target vs. pool). Persistence
/// canonicalizes the pair to a sorted id key so both directions collapse
/// onto one stored relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "targetId")]
    pub target_id: String,
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    pub tier: MatchTier,
    pub compatibility: u8,
    #[serde(rename = "scoreDelta")]
    pub score_delta: u8,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    pub synergies: Vec<String>,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub status: MatchStatus,
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Parameters for the CRM directory candidate query
#[derive(Debug, Clone)]
pub struct DirectoryQuery {
    pub bounding_box: Option<BoundingBox>,
    pub exclude_business_ids: Vec<String>,
    pub limit: usize,
}

/// Scoring weights for the five dimensions. Fixed product constants; the
/// configuration layer may override them but rejects any set that does not
/// sum to 1.0.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    pub seo: f64,
    pub content: f64,
    pub physical_presence: f64,
    pub reputation: f64,
    pub position: f64,
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.seo + self.content + self.physical_presence + self.reputation + self.position
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            seo: 0.25,
            content: 0.20,
            physical_presence: 0.20,
            reputation: 0.20,
            position: 0.15,
        }
    }
}
