use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::models::{BusinessSignals, DirectoryQuery};

/// Errors that can occur when interacting with the CRM directory
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// CRM directory API client
///
/// The CRM backend is a document store; this client reads the business
/// documents the ingestion pipeline maintains there. Signal assembly
/// (listing lookups, review fetches, geocoding) happens upstream: by the
/// time a document lands here it either carries a signal or it doesn't.
pub struct CrmClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    client: Client,
    collections: CrmCollections,
}

/// Collection IDs in the CRM document store
#[derive(Debug, Clone)]
pub struct CrmCollections {
    pub businesses: String,
}

impl CrmClient {
    /// Create a new CRM client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collections: CrmCollections,
    ) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            project_id,
            database_id,
            client,
            collections,
        }
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.collections.businesses
        )
    }

    /// Get a single business by id
    pub async fn get_business(&self, business_id: &str) -> Result<BusinessSignals, CrmError> {
        let query_json = format!(r#"["businessId={}"]"#, business_id);
        let encoded_query = urlencoding::encode(&query_json);

        let url = format!("{}?query={}", self.documents_url(), encoded_query);

        tracing::debug!("Fetching business: {}", business_id);

        let response = self
            .client
            .get(&url)
            .header("X-Crm-Key", &self.api_key)
            .header("X-Crm-Project", &self.project_id)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Failed to fetch business {}: {} - {}", business_id, status, body);
            return Err(CrmError::ApiError(format!(
                "Failed to fetch business: {}",
                status
            )));
        }

        let json: Value = response.json().await?;

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| CrmError::InvalidResponse("Missing documents array".into()))?;

        let doc = documents
            .first()
            .ok_or_else(|| CrmError::NotFound(format!("Business {} not found", business_id)))?;

        let data = doc.get("data").unwrap_or(doc);

        serde_json::from_value(data.clone())
            .map_err(|e| CrmError::InvalidResponse(format!("Failed to parse business: {}", e)))
    }

    /// Query businesses for a candidate pool
    ///
    /// The bounding box scopes the query server-side; exact distances and
    /// all matching rules are applied by the core afterwards.
    pub async fn query_businesses(
        &self,
        query: &DirectoryQuery,
    ) -> Result<Vec<BusinessSignals>, CrmError> {
        let mut filters = Vec::new();

        for id in &query.exclude_business_ids {
            filters.push(format!("notEqual(\"businessId\", \"{}\")", id));
        }

        if let Some(bbox) = &query.bounding_box {
            filters.push(format!("greaterThan(\"latitude\", {})", bbox.min_lat));
            filters.push(format!("lessThan(\"latitude\", {})", bbox.max_lat));
            filters.push(format!("greaterThan(\"longitude\", {})", bbox.min_lon));
            filters.push(format!("lessThan(\"longitude\", {})", bbox.max_lon));
        }

        filters.push(format!("limit({})", query.limit));

        let filters_json = serde_json::to_string(&filters)
            .map_err(|e| CrmError::InvalidResponse(e.to_string()))?;
        let encoded_filters = urlencoding::encode(&filters_json);

        let full_url = format!("{}?query={}", self.documents_url(), encoded_filters);

        let response = self
            .client
            .get(&full_url)
            .header("X-Crm-Key", &self.api_key)
            .header("X-Crm-Project", &self.project_id)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CrmError::ApiError(format!(
                "Failed to query businesses: {}",
                response.status()
            )));
        }

        let json: Value = response.json().await?;

        let total = json.get("total").and_then(|t| t.as_u64()).unwrap_or(0);

        let documents = json
            .get("documents")
            .and_then(|d| d.as_array())
            .ok_or_else(|| CrmError::InvalidResponse("Missing documents array".into()))?;

        let businesses: Vec<BusinessSignals> = documents
            .iter()
            .filter_map(|doc| {
                let data = doc.get("data").unwrap_or(doc);
                serde_json::from_value(data.clone()).ok()
            })
            .filter(|b: &BusinessSignals| !query.exclude_business_ids.contains(&b.business_id))
            .collect();

        tracing::debug!("Queried {} businesses (total: {})", businesses.len(), total);

        Ok(businesses)
    }
}
