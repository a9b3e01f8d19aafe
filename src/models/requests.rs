use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::BusinessSignals;

/// Request to evaluate one business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateScoreRequest {
    pub business: BusinessSignals,
    /// When true and `websiteReachable` is unknown, the service runs the
    /// short-timeout liveness probe before scoring.
    #[serde(rename = "probeWebsite", default = "default_true")]
    pub probe_website: bool,
}

/// Request to evaluate a batch of businesses. Item failures are reported
/// per item; they never abort the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchEvaluateRequest {
    pub businesses: Vec<BusinessSignals>,
    #[serde(rename = "probeWebsite", default = "default_true")]
    pub probe_website: bool,
}

fn default_true() -> bool {
    true
}

/// Request to find partner matches for a target business
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FindPartnersRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "business_id", rename = "businessId")]
    pub business_id: String,
    #[serde(default = "default_limit")]
    pub limit: u16,
    #[serde(default)]
    #[serde(alias = "exclude_business_ids", rename = "excludeBusinessIds")]
    pub exclude_business_ids: Vec<String>,
}

fn default_limit() -> u16 {
    20
}

/// Request to transition a stored match out of `pending`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateMatchStatusRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "business_id", rename = "businessId")]
    pub business_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "partner_id", rename = "partnerId")]
    pub partner_id: String,
    pub status: String,
}
