use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post, put},
    Router,
};
use moka::future::Cache;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use c2s_gateway::{
    config::Config,
    enrichment::CampaignEnricher,
    gateway_client::C2sClient,
    handlers::{self, AppState},
    mapping_store::MappingStore,
    services::AdsResolverService,
    webhook_handler,
};

/// Serves the OpenAPI specification YAML file.
///
/// Reads `openapi.yml` from the working directory and serves it with the
/// appropriate content type. Returns 404 if the file is not found.
async fn serve_openapi_spec() -> impl IntoResponse {
    match tokio::fs::read_to_string("openapi.yml").await {
        Ok(content) => (
            StatusCode::OK,
            [(axum::http::header::CONTENT_TYPE, "text/yaml")],
            content,
        )
            .into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "OpenAPI spec not found").into_response(),
    }
}

/// Serves the Swagger UI HTML page.
///
/// Returns an HTML page embedding Swagger UI, configured to load the
/// specification served by `serve_openapi_spec`.
async fn serve_swagger_ui() -> impl IntoResponse {
    let html = r#"
<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>C2S Gateway - Swagger UI</title>
    <link rel="stylesheet" type="text/css" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
    <style>
        body { margin: 0; padding: 0; }
    </style>
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-standalone-preset.js"></script>
    <script>
        window.onload = function() {
            window.ui = SwaggerUIBundle({
                url: "/api-docs/openapi.yml",
                dom_id: '#swagger-ui',
                deepLinking: true,
                presets: [
                    SwaggerUIBundle.presets.apis,
                    SwaggerUIStandalonePreset
                ],
                layout: "StandaloneLayout"
            });
        };
    </script>
</body>
</html>
"#;
    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/html; charset=utf-8")],
        html,
    )
}

/// Main entry point for the application.
///
/// Initializes logging, configuration, the campaign mapping store, the
/// external API clients, and the HTTP routes with their middleware (CORS,
/// rate limiting, body size limit), then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "c2s_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Load the campaign mapping table. A missing or malformed file is fatal:
    // serving with an empty table would silently un-enrich every lead.
    let store = Arc::new(MappingStore::with_file(&config.campaign_mapping_path)?);
    let enricher = CampaignEnricher::new(store);

    // Lead-level deduplication cache to absorb webhook retries and races
    // 5 minute TTL is enough to cover typical request processing time
    let processing_leads_cache = Cache::builder()
        .time_to_live(Duration::from_secs(300))
        .max_capacity(10_000)
        .build();
    tracing::info!("Lead deduplication cache initialized");

    // C2S integration client
    let c2s = C2sClient::new(config.c2s_base_url.clone(), config.c2s_token.clone())?;
    tracing::info!("✓ C2S client initialized: {}", config.c2s_base_url);

    // Ads attribution resolver client
    let resolver = AdsResolverService::new(&config)?;
    tracing::info!("✓ Ads resolver client initialized: {}", config.ads_resolver_url);

    // Build application state
    let app_state = Arc::new(AppState {
        config: config.clone(),
        enricher,
        c2s,
        resolver,
        processing_leads_cache,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Build protected routes with security layers
    let protected_routes = Router::new()
        // API documentation
        .route("/docs", get(serve_swagger_ui))
        .route("/api-docs/openapi.yml", get(serve_openapi_spec))
        // Service metadata
        .route("/", get(handlers::root))
        // Google Ads webhook (enrich + forward)
        .route(
            "/webhooks/google-ads",
            post(webhook_handler::google_ads_webhook),
        )
        // Campaign mapping administration
        .route(
            "/campaigns/:campaign_id",
            get(handlers::get_campaign_mapping).put(handlers::put_campaign_mapping),
        )
        // Leads
        .route(
            "/leads",
            get(handlers::list_leads).post(handlers::create_lead),
        )
        .route("/leads/resolve-source", get(handlers::resolve_lead_source))
        .route(
            "/leads/:lead_id",
            get(handlers::get_lead).patch(handlers::update_lead),
        )
        .route("/leads/:lead_id/forward", patch(handlers::forward_lead))
        .route(
            "/leads/:lead_id/tags",
            get(handlers::get_lead_tags).post(handlers::create_lead_tag),
        )
        .route(
            "/leads/:lead_id/mark-interacted",
            post(handlers::mark_lead_interacted),
        )
        .route("/leads/:lead_id/messages", post(handlers::create_message))
        .route("/leads/:lead_id/visits", post(handlers::create_visit))
        .route(
            "/leads/:lead_id/activities",
            post(handlers::create_activity),
        )
        .route("/leads/:lead_id/done-deal", post(handlers::mark_done_deal))
        // Tags
        .route(
            "/tags",
            get(handlers::list_tags).post(handlers::create_tag),
        )
        // Sellers
        .route(
            "/sellers",
            get(handlers::list_sellers).post(handlers::create_seller),
        )
        .route("/sellers/:seller_id", put(handlers::update_seller))
        // Distribution
        .route(
            "/distribution/queues",
            get(handlers::list_distribution_queues),
        )
        .route(
            "/distribution/queues/:queue_id/redistribute",
            post(handlers::redistribute_lead),
        )
        .route(
            "/distribution/queues/:queue_id/sellers",
            get(handlers::get_queue_sellers),
        )
        .route(
            "/distribution/queues/:queue_id/priority",
            post(handlers::update_seller_priority),
        )
        .route(
            "/distribution/queues/:queue_id/next-seller",
            post(handlers::set_next_seller),
        )
        .route(
            "/distribution/rules",
            post(handlers::create_distribution_rule),
        )
        // Company & webhook management
        .route("/company/me", get(handlers::get_company_info))
        .route("/webhooks/subscribe", post(handlers::subscribe_webhook))
        .route(
            "/webhooks/unsubscribe",
            post(handlers::unsubscribe_webhook),
        )
        .layer(
            ServiceBuilder::new()
                // Request size limit: 5MB max payload
                .layer(RequestBodyLimitLayer::new(5 * 1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Health check bypasses rate limiting so platform probes never get 429s
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
