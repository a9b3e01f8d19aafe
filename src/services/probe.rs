use reqwest::Client;
use std::time::Duration;

use crate::models::BusinessSignals;

/// Website reachability probe
///
/// A short-timeout liveness check that gates the SEO reachability bonus.
/// It is not a ranking signal: any failure (timeout, DNS, connection
/// refused) resolves to `false`, so the bonus is denied and nothing errors
/// into scoring.
pub struct ReachabilityProbe {
    client: Client,
}

impl ReachabilityProbe {
    pub fn new(timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(3))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Check whether a URL answers with a successful response
    pub async fn check(&self, url: &str) -> bool {
        match self.client.head(url).send().await {
            Ok(response) => {
                let reachable = response.status().is_success();
                tracing::debug!("Probe {}: {} ({})", url, reachable, response.status());
                reachable
            }
            Err(e) => {
                tracing::debug!("Probe {} failed: {}", url, e);
                false
            }
        }
    }

    /// Resolve `website_reachable` for signals where it is still unknown.
    /// Runs strictly before `evaluate`; scoring itself stays pure.
    pub async fn resolve(&self, signals: &mut BusinessSignals) {
        if !signals.has_website || signals.website_reachable.is_some() {
            return;
        }

        signals.website_reachable = match &signals.website_url {
            Some(url) => Some(self.check(url).await),
            // No URL on file: the probe cannot run, deny the bonus
            None => Some(false),
        };
    }
}
