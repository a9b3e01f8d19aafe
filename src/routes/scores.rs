use actix_web::{web, HttpResponse, Responder};

use crate::core::scoring;
use crate::models::{
    BatchEvaluateRequest, BatchEvaluateResponse, BatchFailure, ErrorResponse,
    EvaluateScoreRequest, EvaluateScoreResponse, ScoreRecord,
};
use crate::routes::matches::AppState;
use crate::services::{signals_fingerprint, CacheKey};

/// Configure all score-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/scores/evaluate", web::post().to(evaluate_score))
        .route("/scores/batch", web::post().to(batch_evaluate))
        .route("/scores/{business_id}/latest", web::get().to(get_latest_score))
        .route("/scores/{business_id}/history", web::get().to(get_score_history));
}

/// Evaluate one business and persist the record
///
/// POST /api/v1/scores/evaluate
///
/// Request body:
/// ```json
/// {
///   "business": { ... BusinessSignals ... },
///   "probeWebsite": true
/// }
/// ```
///
/// If reachability is unknown and probing is enabled, the liveness probe
/// runs first; scoring itself is pure over the resolved signals. Identical
/// inputs hit the score cache instead of recomputing.
async fn evaluate_score(
    state: web::Data<AppState>,
    req: web::Json<EvaluateScoreRequest>,
) -> impl Responder {
    let mut signals = req.business.clone();

    if req.probe_website {
        state.probe.resolve(&mut signals).await;
    }

    let fingerprint = signals_fingerprint(&signals);
    let cache_key = CacheKey::score(&signals.business_id, &fingerprint);

    if let Ok(Some(record)) = state.cache.get::<ScoreRecord>(&cache_key).await {
        tracing::debug!("Score cache hit for {}", signals.business_id);
        return HttpResponse::Ok().json(EvaluateScoreResponse {
            incomplete_data: !signals.is_complete(),
            record,
        });
    }

    let record = match scoring::evaluate(&signals, &state.weights) {
        Ok(record) => record,
        Err(e) => {
            tracing::info!("Rejected signals for scoring: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse {
                error: "Invalid input".to_string(),
                message: e.to_string(),
                status_code: 400,
            });
        }
    };

    if let Err(e) = state.postgres.insert_score_record(&record).await {
        tracing::error!("Failed to persist score for {}: {}", record.business_id, e);
        return HttpResponse::InternalServerError().json(ErrorResponse {
            error: "Failed to persist score".to_string(),
            message: e.to_string(),
            status_code: 500,
        });
    }

    if let Err(e) = state.cache.set(&cache_key, &record).await {
        tracing::warn!("Failed to cache score: {}", e);
    }

    HttpResponse::Ok().json(EvaluateScoreResponse {
        incomplete_data: !signals.is_complete(),
        record,
    })
}

/// Evaluate a batch of businesses
///
/// POST /api/v1/scores/batch
///
/// Each business is evaluated independently; a rejected or failed item is
/// reported in `failures` and never aborts its siblings.
async fn batch_evaluate(
    state: web::Data<AppState>,
    req: web::Json<BatchEvaluateRequest>,
) -> impl Responder {
    let mut scored = Vec::with_capacity(req.businesses.len());
    let mut failures = Vec::new();

    for business in &req.businesses {
        let mut signals = business.clone();

        if req.probe_website {
            state.probe.resolve(&mut signals).await;
        }

        let record = match scoring::evaluate(&signals, &state.weights) {
            Ok(record) => record,
            Err(e) => {
                failures.push(BatchFailure {
                    business_id: signals.business_id.clone(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        if let Err(e) = state.postgres.insert_score_record(&record).await {
            tracing::error!("Failed to persist score for {}: {}", record.business_id, e);
            failures.push(BatchFailure {
                business_id: record.business_id.clone(),
                error: e.to_string(),
            });
            continue;
        }

        let cache_key = CacheKey::score(&signals.business_id, &signals_fingerprint(&signals));
        if let Err(e) = state.cache.set(&cache_key, &record).await {
            tracing::warn!("Failed to cache score: {}", e);
        }

        scored.push(EvaluateScoreResponse {
            incomplete_data: !signals.is_complete(),
            record,
        });
    }

    // Match lists are derived from scores; a re-scored batch makes any
    // cached list stale
    if !scored.is_empty() {
        if let Err(e) = state.cache.invalidate_pattern("matches:*").await {
            tracing::warn!("Failed to invalidate match caches: {}", e);
        }
    }

    tracing::info!(
        "Batch evaluation: {} scored, {} rejected",
        scored.len(),
        failures.len()
    );

    HttpResponse::Ok().json(BatchEvaluateResponse { scored, failures })
}

/// Latest score record for a business
///
/// GET /api/v1/scores/{businessId}/latest
async fn get_latest_score(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let business_id = path.into_inner();

    match state.postgres.get_latest_score(&business_id).await {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: "No score record".to_string(),
            message: format!("business {} has never been evaluated", business_id),
            status_code: 404,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch latest score for {}: {}", business_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch score".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}

/// Score history for a business, newest first
///
/// GET /api/v1/scores/{businessId}/history?limit=20&offset=0
async fn get_score_history(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<std::collections::HashMap<String, String>>,
) -> impl Responder {
    let business_id = path.into_inner();
    let limit = query
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(20usize)
        .min(100);
    let offset = query
        .get("offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0usize);

    match state
        .postgres
        .get_score_history(&business_id, limit, offset)
        .await
    {
        Ok(records) => {
            let count = records.len();
            HttpResponse::Ok().json(serde_json::json!({
                "businessId": business_id,
                "records": records,
                "count": count,
            }))
        }
        Err(e) => {
            tracing::error!("Failed to fetch score history for {}: {}", business_id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to fetch score history".to_string(),
                message: e.to_string(),
                status_code: 500,
            })
        }
    }
}
