use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::config::MatchingSettings;
use crate::core::{calculate_bounding_box, eligible_pool, filters, Matcher};
use crate::models::{
    DirectoryQuery, ErrorResponse, FindPartnersRequest, FindPartnersResponse, HealthResponse,
    MatchStatus, ScoringWeights, UpdateMatchStatusRequest, UpdateMatchStatusResponse,
};
use crate::services::{
    CacheKey, CacheManager, CrmClient, CrmError, PostgresClient, PostgresError, ReachabilityProbe,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub crm: Arc<CrmClient>,
    pub cache: Arc<CacheManager>,
    pub postgres: Arc<PostgresClient>,
    pub probe: Arc<ReachabilityProbe>,
    pub matcher: Matcher,
    pub weights: ScoringWeights,
    pub matching: MatchingSettings,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_partners))
        .route("/matches/status", web::post().to(update_match_status))
        .route("/matches", web::get().to(get_matches))
        .route("/matches/stats", web::get().to(get_match_stats))
        .route("/debug/echo", web::post().to(debug_echo));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Debug endpoint to echo raw JSON for debugging
async fn debug_echo(body: web::Bytes, req: actix_web::HttpRequest) -> impl Responder {
    let body_str = String::from_utf8_lossy(&body);
    tracing::info!(
        "DEBUG echo - path: {}, method: {}, body: {}",
        req.path(),
        req.method(),
        body_str
    );
    HttpResponse::Ok().json(serde_json::json!({
        "path": req.path(),
        "method": req.method().to_string(),
        "body": body_str,
    }))
}

/// Find partner matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "businessId": "string",
///   "limit": 20,
///   "excludeBusinessIds": ["string"]
/// }
/// ```
///
/// Assembles a candidate pool from the CRM directory (scoped by the
/// configured search radius), attaches each candidate's latest score,
/// runs the matcher, and persists the results deduplicated by pair.
async fn find_partners(
    state: web::Data<AppState>,
    req: web::Json<FindPartnersRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let business_id = &req.business_id;
    let max_limit = state.matching.max_limit.unwrap_or(100) as u16;
    let limit = req.limit.min(max_limit) as usize;

    tracing::info!("Finding partners for business: {}, limit: {}", business_id, limit);

    // Fetch the target business from the CRM directory
    let target_signals = match state.crm.get_business(business_id).await {
        Ok(signals) => signals,
        Err(CrmError::NotFound(msg)) => {
            return HttpResponse::NotFound().json(ErrorResponse {
                error: "Business not found".to_string(),
                message: msg,
                status_code: 404,
            });
        }
        Err(e) => {
            tracing::error!("Failed to fetch business {}: {}", business_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch business".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    // A target without a current score record cannot be matched
    let target_score = match state.postgres.get_latest_score(business_id).await {
        Ok(Some(score)) => score,
        Ok(None) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Business not scored".to_string(),
                message: format!("business {} has no score record; evaluate it first", business_id),
                status_code: 400,
            });
        }
        Err(e) => {
            tracing::error!("Failed to fetch score for {}: {}", business_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch score".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let target = match filters::candidate(target_signals, target_score) {
        Ok(target) => target,
        Err(e) => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Business not matchable".to_string(),
                message: e.to_string(),
                status_code: 400,
            });
        }
    };

    // Scope the directory query around the target
    let bounding_box = calculate_bounding_box(target.coordinates, state.matching.search_radius_km);

    let mut exclude_ids = vec![business_id.clone()];
    exclude_ids.extend(req.exclude_business_ids.clone());

    let query = DirectoryQuery {
        bounding_box: Some(bounding_box),
        exclude_business_ids: exclude_ids,
        limit: limit * 5,
    };

    let pool_signals = match state.crm.query_businesses(&query).await {
        Ok(businesses) => businesses,
        Err(e) => {
            tracing::error!("Failed to query candidates for {}: {}", business_id, e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to query candidates".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    tracing::debug!("Found {} candidates for {}", pool_signals.len(), business_id);

    // Attach each candidate's latest score record
    let candidate_ids: Vec<String> = pool_signals
        .iter()
        .map(|b| b.business_id.clone())
        .collect();

    let mut scores = match state.postgres.get_latest_scores(&candidate_ids).await {
        Ok(scores) => scores,
        Err(e) => {
            tracing::error!("Failed to fetch candidate scores: {}", e);
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch candidate scores".to_string(),
                message: e.to_string(),
                status_code: 500,
            });
        }
    };

    let entries: Vec<_> = pool_signals
        .into_iter()
        .map(|signals| {
            let score = scores.remove(&signals.business_id);
            (signals, score)
        })
        .collect();

    let (pool, ineligible) = eligible_pool(entries);

    // Run the matching algorithm
    let report = state.matcher.find_partners(&target, &pool, limit);

    // Persist results; a failed write is surfaced, the computation itself
    // is idempotent and can be re-invoked
    if let Err(e) = state.postgres.record_matches(&report.matches).await {
        tracing::error!("Failed to persist matches for {}: {}", business_id, e);
        return HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Failed to persist matches".to_string(),
            message: e.to_string(),
            status_code: 500,
        });
    }

    // Both the target's and each partner's cached lists changed
    if let Err(e) = state.cache.delete(&CacheKey::matches(business_id)).await {
        tracing::warn!("Failed to invalidate match cache: {}", e);
    }
    for m in &report.matches {
        if let Err(e) = state.cache.delete(&CacheKey::matches(&m.candidate_id)).await {
            tracing::warn!("Failed to invalidate match cache: {}", e);
        }
    }

    tracing::info!(
        "Returning {} matches for business {} (from {} candidates, {} competitors excluded, {} ineligible)",
        report.matches.len(),
        business_id,
        report.total_candidates,
        report.excluded_competitors,
        ineligible
    );

    HttpResponse::Ok().json(FindPartnersResponse {
        matches: report.matches,
        total_candidates: report.total_candidates,
        excluded_competitors: report.excluded_competitors,
        ineligible,
    })
}

/// Match status transition endpoint
///
/// POST /api/v1/matches/status
///
/// Request body:
/// ```json
/// {
///   "businessId": "string",
///   "partnerId": "string",
///   "status": "accepted|rejected"
/// }
/// ```
///
/// The lifecycle belongs to the CRM: the matcher only ever produces
/// `pending`, and `pending` is the only state with outgoing transitions.
async fn update_match_status(
    state: web::Data<AppState>,
    req: web::Json<UpdateMatchStatusRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let status = match req.status.to_lowercase().as_str() {
        "accepted" => MatchStatus::Accepted,
        "rejected" => MatchStatus::Rejected,
        _ => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid status".to_string(),
                message: "Status must be one of: accepted, rejected".to_string(),
                status_code: 400,
            });
        }
    };

    match state
        .postgres
        .update_match_status(&req.business_id, &req.partner_id, status)
        .await
    {
        Ok(()) => {
            // Both sides of the pair see the transition
            for id in [&req.business_id, &req.partner_id] {
                if let Err(e) = state.cache.delete(&CacheKey::matches(id)).await {
                    tracing::warn!("Failed to invalidate match cache: {}", e);
                }
            }

            HttpResponse::Ok().json(UpdateMatchStatusResponse {
                success: true,
                business_id: req.business_id.clone(),
                partner_id: req.partner_id.clone(),
                status: req.status.to_lowercase(),
            })
        }
        Err(PostgresError::NotFound(msg)) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Match not found".to_string(),
            message: msg,
            status_code: 404,
        }),
        Err(PostgresError::InvalidTransition(msg)) => HttpResponse::Conflict().json(ErrorResponse {
            error: "Invalid transition".to_string(),
            message: msg,
            status_code: 409,
        }),
        Err(e) => {
            tracing::error!("Failed to update match status: {}", e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to update match status".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Get stored matches for a business
///
/// GET /api/v1/matches?businessId={businessId}
async fn get_matches(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let business_id = match query.get("businessId") {
        Some(id) => id,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing businessId parameter".to_string(),
                message: "businessId query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };

    let cache_key = CacheKey::matches(business_id);
    if let Ok(Some(cached)) = state.cache.get::<serde_json::Value>(&cache_key).await {
        return HttpResponse::Ok().json(cached);
    }

    match state.postgres.get_matches_for(business_id).await {
        Ok(matches) => {
            let count = matches.len();
            let response = serde_json::json!({
                "businessId": business_id,
                "matches": matches,
                "count": count,
            });

            if let Err(e) = state.cache.set(&cache_key, &response).await {
                tracing::warn!("Failed to cache matches: {}", e);
            }

            HttpResponse::Ok().json(response)
        }
        Err(e) => {
            tracing::error!("Failed to fetch matches for {}: {}", business_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch matches".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Get match statistics for a business
///
/// GET /api/v1/matches/stats?businessId={businessId}
async fn get_match_stats(
    state: web::Data<AppState>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let business_id = match query.get("businessId") {
        Some(id) => id,
        None => {
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Missing businessId parameter".to_string(),
                message: "businessId query parameter is required".to_string(),
                status_code: 400,
            });
        }
    };

    match state.postgres.get_match_stats(business_id).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => {
            tracing::error!("Failed to fetch match stats for {}: {}", business_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch match stats".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }
}
