use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub c2s_token: String,
    pub c2s_base_url: String,
    pub campaign_mapping_path: String,
    pub ads_resolver_url: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8001".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            c2s_token: std::env::var("C2S_TOKEN")
                .map_err(|_| anyhow::anyhow!("C2S_TOKEN environment variable required"))
                .and_then(|token| {
                    if token.trim().is_empty() {
                        anyhow::bail!("C2S_TOKEN cannot be empty");
                    }
                    Ok(token)
                })?,
            c2s_base_url: std::env::var("C2S_BASE_URL")
                .map_err(|_| anyhow::anyhow!("C2S_BASE_URL environment variable required"))
                .and_then(|url| {
                    if url.trim().is_empty() {
                        anyhow::bail!("C2S_BASE_URL cannot be empty");
                    }
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        anyhow::bail!("C2S_BASE_URL must start with http:// or https://");
                    }
                    Ok(url.trim_end_matches('/').to_string())
                })?,
            campaign_mapping_path: std::env::var("CAMPAIGN_MAPPING_PATH")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| "campaign_mapping.json".to_string()),
            ads_resolver_url: {
                let url = std::env::var("ADS_RESOLVER_URL")
                    .unwrap_or_else(|_| "https://ibvi-ads-gateway.fly.dev".to_string());
                if !url.starts_with("http://") && !url.starts_with("https://") {
                    anyhow::bail!("ADS_RESOLVER_URL must start with http:// or https://");
                }
                url.trim_end_matches('/').to_string()
            },
        };

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        tracing::debug!("C2S Base URL: {}", config.c2s_base_url);
        tracing::debug!("Campaign mapping path: {}", config.campaign_mapping_path);
        tracing::debug!("Ads resolver URL: {}", config.ads_resolver_url);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
