use crate::config::Config;
use crate::errors::AppError;
use crate::models::ResolveSourceQuery;
use serde_json::Value;
use std::time::Duration;

/// Client for the external ad-metadata resolver.
///
/// The resolver owns the Google Ads API access; this service only forwards
/// identifier queries and returns its JSON verbatim.
#[derive(Clone)]
pub struct AdsResolverService {
    client: reqwest::Client,
    base_url: String,
}

impl AdsResolverService {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create resolver client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.ads_resolver_url.clone(),
        })
    }

    /// Resolves form/ad-group/campaign identifiers to human-readable names.
    ///
    /// Returns the resolver response as-is, e.g. `ad_group_name`,
    /// `campaign_name`, `form_headline`, `product_description`.
    pub async fn resolve_source(&self, query: &ResolveSourceQuery) -> Result<Value, AppError> {
        // Build URL with proper parameter encoding
        let url = reqwest::Url::parse_with_params(
            &format!("{}/v1/leads/resolve-source", self.base_url),
            &query.to_query(),
        )
        .map_err(|e| AppError::ExternalApiError(format!("Failed to build URL: {}", e)))?;

        tracing::info!("Resolving lead source via ads gateway");
        tracing::debug!("Resolver URL: {}", url);

        let response = self.client.get(url).send().await.map_err(|e| {
            AppError::ExternalApiError(format!("Ads resolver request failed: {}", e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "Ads resolver returned {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse resolver response: {}", e))
        })
    }
}
