use serde::{Deserialize, Serialize};

use crate::models::domain::{MatchResult, ScoreRecord};

/// Response for the single-business evaluate endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateScoreResponse {
    pub record: ScoreRecord,
    /// Set when signals the engine consumes were missing (no coordinates,
    /// unknown reachability). The CRM shows this flag instead of an error.
    #[serde(rename = "incompleteData")]
    pub incomplete_data: bool,
}

/// One failed item in a batch evaluation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchFailure {
    #[serde(rename = "businessId")]
    pub business_id: String,
    pub error: String,
}

/// Response for the batch evaluate endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEvaluateResponse {
    pub scored: Vec<EvaluateScoreResponse>,
    pub failures: Vec<BatchFailure>,
}

/// Response for the find-partners endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindPartnersResponse {
    pub matches: Vec<MatchResult>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(rename = "excludedCompetitors")]
    pub excluded_competitors: usize,
    /// Pool entries skipped for missing coordinates or score
    pub ineligible: usize,
}

/// Response for the status transition endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMatchStatusResponse {
    pub success: bool,
    #[serde(rename = "businessId")]
    pub business_id: String,
    #[serde(rename = "partnerId")]
    pub partner_id: String,
    pub status: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
