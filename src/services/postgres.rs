use serde::{Deserialize, Serialize};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::models::{Dimension, MatchResult, MatchStatus, MatchTier, ScoreRecord};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("Connection pool error: {0}")]
    PoolError(#[from] deadpool_postgres::PoolError),

    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),
}

/// Database-side match tier
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_tier", rename_all = "snake_case")]
pub enum TierType {
    Ideal,
    Compensated,
    NotRecommended,
}

impl From<MatchTier> for TierType {
    fn from(value: MatchTier) -> Self {
        match value {
            MatchTier::Ideal => TierType::Ideal,
            MatchTier::Compensated => TierType::Compensated,
            MatchTier::NotRecommended => TierType::NotRecommended,
        }
    }
}

impl From<TierType> for MatchTier {
    fn from(value: TierType) -> Self {
        match value {
            TierType::Ideal => MatchTier::Ideal,
            TierType::Compensated => MatchTier::Compensated,
            TierType::NotRecommended => MatchTier::NotRecommended,
        }
    }
}

/// Database-side match status
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
pub enum StatusType {
    Pending,
    Accepted,
    Rejected,
}

impl From<MatchStatus> for StatusType {
    fn from(value: MatchStatus) -> Self {
        match value {
            MatchStatus::Pending => StatusType::Pending,
            MatchStatus::Accepted => StatusType::Accepted,
            MatchStatus::Rejected => StatusType::Rejected,
        }
    }
}

impl From<StatusType> for MatchStatus {
    fn from(value: StatusType) -> Self {
        match value {
            StatusType::Pending => MatchStatus::Pending,
            StatusType::Accepted => MatchStatus::Accepted,
            StatusType::Rejected => MatchStatus::Rejected,
        }
    }
}

/// Per-business match statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchStats {
    pub business_id: String,
    pub total: i64,
    pub pending: i64,
    pub accepted: i64,
    pub rejected: i64,
    pub last_created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// PostgreSQL client for score history and partner matches
///
/// Score records are append-only: every evaluation inserts a new row, so
/// the score history of a business is fully auditable. Partner matches are
/// keyed by the sorted id pair, collapsing the matcher's directional output
/// onto one stored relationship.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        _acquire_timeout_secs: Option<u64>,
        _idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
        )
        .await
    }

    /// Append a score record. Records are never updated in place.
    pub async fn insert_score_record(&self, record: &ScoreRecord) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO score_records
                (business_id, evaluated_at, seo, content, physical_presence,
                 reputation, position, overall, weakest_dimension,
                 recommended_action, analysis)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#;

        sqlx::query(query)
            .bind(&record.business_id)
            .bind(record.evaluated_at)
            .bind(record.seo as i16)
            .bind(record.content as i16)
            .bind(record.physical_presence as i16)
            .bind(record.reputation as i16)
            .bind(record.position as i16)
            .bind(record.overall as i16)
            .bind(record.weakest_dimension.as_str())
            .bind(&record.recommended_action)
            .bind(&record.analysis)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            "Stored score record for {} (overall {})",
            record.business_id,
            record.overall
        );

        Ok(())
    }

    /// Latest score record for one business
    pub async fn get_latest_score(
        &self,
        business_id: &str,
    ) -> Result<Option<ScoreRecord>, PostgresError> {
        let query = r#"
            SELECT business_id, evaluated_at, seo, content, physical_presence,
                   reputation, position, overall, weakest_dimension,
                   recommended_action, analysis
            FROM score_records
            WHERE business_id = $1
            ORDER BY evaluated_at DESC
            LIMIT 1
        "#;

        let row = sqlx::query(query)
            .bind(business_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| score_record_from_row(&r)).transpose()
    }

    /// Latest score record per business, for pool assembly
    pub async fn get_latest_scores(
        &self,
        business_ids: &[String],
    ) -> Result<HashMap<String, ScoreRecord>, PostgresError> {
        if business_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let query = r#"
            SELECT DISTINCT ON (business_id)
                   business_id, evaluated_at, seo, content, physical_presence,
                   reputation, position, overall, weakest_dimension,
                   recommended_action, analysis
            FROM score_records
            WHERE business_id = ANY($1)
            ORDER BY business_id, evaluated_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(business_ids)
            .fetch_all(&self.pool)
            .await?;

        let mut scores = HashMap::with_capacity(rows.len());
        for row in &rows {
            let record = score_record_from_row(row)?;
            scores.insert(record.business_id.clone(), record);
        }

        Ok(scores)
    }

    /// Score history for a business, newest first
    pub async fn get_score_history(
        &self,
        business_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<ScoreRecord>, PostgresError> {
        let query = r#"
            SELECT business_id, evaluated_at, seo, content, physical_presence,
                   reputation, position, overall, weakest_dimension,
                   recommended_action, analysis
            FROM score_records
            WHERE business_id = $1
            ORDER BY evaluated_at DESC
            LIMIT $2 OFFSET $3
        "#;

        let rows = sqlx::query(query)
            .bind(business_id)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(score_record_from_row).collect()
    }

    /// Store a batch of match results, deduplicated on the sorted id pair.
    ///
    /// Re-running the matcher (in either direction) refreshes a pair still
    /// in `pending`; a pair the CRM has already accepted or rejected keeps
    /// its decision.
    pub async fn record_matches(&self, matches: &[MatchResult]) -> Result<(), PostgresError> {
        let query = r#"
            INSERT INTO partner_matches
                (pair_min_id, pair_max_id, target_id, candidate_id, tier,
                 compatibility, score_delta, distance_km, synergies, status,
                 created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (pair_min_id, pair_max_id)
            DO UPDATE SET
                target_id = EXCLUDED.target_id,
                candidate_id = EXCLUDED.candidate_id,
                tier = EXCLUDED.tier,
                compatibility = EXCLUDED.compatibility,
                score_delta = EXCLUDED.score_delta,
                distance_km = EXCLUDED.distance_km,
                synergies = EXCLUDED.synergies,
                created_at = EXCLUDED.created_at
            WHERE partner_matches.status = 'pending'
        "#;

        for result in matches {
            let (pair_min, pair_max) = canonical_pair(&result.target_id, &result.candidate_id);

            sqlx::query(query)
                .bind(pair_min)
                .bind(pair_max)
                .bind(&result.target_id)
                .bind(&result.candidate_id)
                .bind(TierType::from(result.tier))
                .bind(result.compatibility as i16)
                .bind(result.score_delta as i16)
                .bind(result.distance_km)
                .bind(&result.synergies)
                .bind(StatusType::from(result.status))
                .bind(result.created_at)
                .execute(&self.pool)
                .await?;
        }

        tracing::debug!("Stored {} match results", matches.len());

        Ok(())
    }

    /// All stored matches involving a business, best compatibility first
    pub async fn get_matches_for(
        &self,
        business_id: &str,
    ) -> Result<Vec<MatchResult>, PostgresError> {
        let query = r#"
            SELECT target_id, candidate_id, tier, compatibility, score_delta,
                   distance_km, synergies, status, created_at
            FROM partner_matches
            WHERE pair_min_id = $1 OR pair_max_id = $1
            ORDER BY compatibility DESC, created_at DESC
        "#;

        let rows = sqlx::query(query)
            .bind(business_id)
            .fetch_all(&self.pool)
            .await?;

        let results = rows
            .iter()
            .map(|row| MatchResult {
                target_id: row.get("target_id"),
                candidate_id: row.get("candidate_id"),
                tier: row.get::<TierType, _>("tier").into(),
                compatibility: row.get::<i16, _>("compatibility") as u8,
                score_delta: row.get::<i16, _>("score_delta") as u8,
                distance_km: row.get("distance_km"),
                synergies: row.get("synergies"),
                created_at: row.get("created_at"),
                status: row.get::<StatusType, _>("status").into(),
            })
            .collect();

        Ok(results)
    }

    /// Transition a stored match out of `pending`. The matcher never calls
    /// this; the lifecycle belongs to the CRM. `pending` is the only state
    /// with outgoing edges, so a second decision is a conflict.
    pub async fn update_match_status(
        &self,
        business_id: &str,
        partner_id: &str,
        status: MatchStatus,
    ) -> Result<(), PostgresError> {
        if status == MatchStatus::Pending {
            return Err(PostgresError::InvalidInput(
                "cannot transition a match back to pending".to_string(),
            ));
        }

        let (pair_min, pair_max) = canonical_pair(business_id, partner_id);

        let query = r#"
            UPDATE partner_matches
            SET status = $3
            WHERE pair_min_id = $1 AND pair_max_id = $2 AND status = 'pending'
        "#;

        let result = sqlx::query(query)
            .bind(pair_min)
            .bind(pair_max)
            .bind(StatusType::from(status))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            // Distinguish an unknown pair from a pair already decided
            let exists = sqlx::query("SELECT 1 FROM partner_matches WHERE pair_min_id = $1 AND pair_max_id = $2")
                .bind(pair_min)
                .bind(pair_max)
                .fetch_optional(&self.pool)
                .await?;

            return match exists {
                Some(_) => Err(PostgresError::InvalidTransition(format!(
                    "match {} / {} already left pending",
                    business_id, partner_id
                ))),
                None => Err(PostgresError::NotFound(format!(
                    "no match between {} and {}",
                    business_id, partner_id
                ))),
            };
        }

        tracing::debug!(
            "Match {} / {} -> {:?}",
            business_id,
            partner_id,
            status
        );

        Ok(())
    }

    /// Match statistics for a business
    pub async fn get_match_stats(&self, business_id: &str) -> Result<MatchStats, PostgresError> {
        let query = r#"
            SELECT
                COUNT(*) as total,
                COUNT(*) FILTER (WHERE status = 'pending') as pending,
                COUNT(*) FILTER (WHERE status = 'accepted') as accepted,
                COUNT(*) FILTER (WHERE status = 'rejected') as rejected,
                MAX(created_at) as last_created_at
            FROM partner_matches
            WHERE pair_min_id = $1 OR pair_max_id = $1
        "#;

        let row = sqlx::query(query)
            .bind(business_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(MatchStats {
            business_id: business_id.to_string(),
            total: row.get("total"),
            pending: row.get("pending"),
            accepted: row.get("accepted"),
            rejected: row.get("rejected"),
            last_created_at: row.get("last_created_at"),
        })
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Sorted id pair used as the storage key for a relationship
fn canonical_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

fn score_record_from_row(row: &sqlx::postgres::PgRow) -> Result<ScoreRecord, PostgresError> {
    let weakest: String = row.get("weakest_dimension");
    let weakest_dimension: Dimension = weakest
        .parse()
        .map_err(PostgresError::InvalidInput)?;

    Ok(ScoreRecord {
        business_id: row.get("business_id"),
        evaluated_at: row.get("evaluated_at"),
        seo: row.get::<i16, _>("seo") as u8,
        content: row.get::<i16, _>("content") as u8,
        physical_presence: row.get::<i16, _>("physical_presence") as u8,
        reputation: row.get::<i16, _>("reputation") as u8,
        position: row.get::<i16, _>("position") as u8,
        overall: row.get::<i16, _>("overall") as u8,
        weakest_dimension,
        recommended_action: row.get("recommended_action"),
        analysis: row.get("analysis"),
    })
}
