use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use moka::future::Cache;
use serde_json::{json, Value};

use crate::{
    config::Config,
    enrichment::CampaignEnricher,
    errors::AppError,
    gateway_client::C2sClient,
    models::{
        ActivityCreate, CampaignInfo, DistributionRuleCreate, DoneDeal, LeadCreate, LeadForward,
        LeadQuery, LeadRedistribute, LeadTagCreate, LeadUpdate, MessageCreate, NextSeller,
        ResolveSourceQuery, SellerCreate, SellerPriority, SellerUpdate, TagCreate, TagQuery,
        VisitCreate, WebhookSubscribe, WebhookUnsubscribe,
    },
    services::AdsResolverService,
};

/// Shared application state.
pub struct AppState {
    /// Application configuration loaded from the environment.
    pub config: Config,
    /// Campaign enrichment engine backed by the persisted mapping table.
    pub enricher: CampaignEnricher,
    /// Client for the C2S integration API.
    pub c2s: C2sClient,
    /// Client for the ads attribution resolver.
    pub resolver: AdsResolverService,
    /// Lead-level deduplication cache to prevent concurrent processing of the same lead_id.
    pub processing_leads_cache: Cache<String, i64>,
}

// ========== Service ==========

/// Health check endpoint.
///
/// Reports the mapping table size so operators can confirm the campaign
/// file was loaded at startup.
pub async fn health(State(state): State<Arc<AppState>>) -> (StatusCode, Json<Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "c2s-gateway",
            "version": env!("CARGO_PKG_VERSION"),
            "campaign_mappings": state.enricher.campaign_count().await,
        })),
    )
}

/// GET /
///
/// Service metadata for anyone hitting the root URL.
pub async fn root(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "name": "C2S Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Gateway for Contact2Sale CRM integration",
        "docs": "/docs",
        "status": "operational",
        "c2s_base_url": state.config.c2s_base_url,
    }))
}

// ========== Campaign Mappings ==========

/// GET /campaigns/:campaign_id
///
/// Looks up the enrichment mapping for a Google Ads campaign.
pub async fn get_campaign_mapping(
    State(state): State<Arc<AppState>>,
    Path(campaign_id): Path<String>,
) -> Result<Json<CampaignInfo>, AppError> {
    state
        .enricher
        .campaign_info(&campaign_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("No mapping for campaign {}", campaign_id)))
}

/// PUT /campaigns/:campaign_id
///
/// Creates or replaces the enrichment mapping for a campaign. The updated
/// table is persisted before the call returns, so a success response means
/// the mapping survives a restart.
pub async fn put_campaign_mapping(
    State(state): State<Arc<AppState>>,
    Path(campaign_id): Path<String>,
    Json(info): Json<CampaignInfo>,
) -> Result<Json<Value>, AppError> {
    state
        .enricher
        .add_campaign_mapping(&campaign_id, info)
        .await?;

    Ok(Json(json!({
        "success": true,
        "campaign_id": campaign_id,
        "total_mappings": state.enricher.campaign_count().await,
    })))
}

// ========== Leads ==========

/// GET /leads/resolve-source
///
/// Proxies ad identifiers to the ads attribution resolver and returns its
/// verdict unchanged. Used to turn form/ad-group ids into human-readable
/// campaign names.
pub async fn resolve_lead_source(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ResolveSourceQuery>,
) -> Result<Json<Value>, AppError> {
    state.resolver.resolve_source(&query).await.map(Json)
}

/// GET /leads
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LeadQuery>,
) -> Result<Json<Value>, AppError> {
    state.c2s.get_leads(&query).await.map(Json)
}

/// GET /leads/:lead_id
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.c2s.get_lead(&lead_id).await.map(Json)
}

/// POST /leads
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    Json(lead): Json<LeadCreate>,
) -> Result<Json<Value>, AppError> {
    state.c2s.create_lead(&lead).await.map(Json)
}

/// PATCH /leads/:lead_id
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    Json(update): Json<LeadUpdate>,
) -> Result<Json<Value>, AppError> {
    state.c2s.update_lead(&lead_id, &update).await.map(Json)
}

/// PATCH /leads/:lead_id/forward
pub async fn forward_lead(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    Json(forward): Json<LeadForward>,
) -> Result<Json<Value>, AppError> {
    state
        .c2s
        .forward_lead(&lead_id, &forward.seller_id)
        .await
        .map(Json)
}

/// GET /leads/:lead_id/tags
pub async fn get_lead_tags(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.c2s.get_lead_tags(&lead_id).await.map(Json)
}

/// POST /leads/:lead_id/tags
pub async fn create_lead_tag(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    Json(tag): Json<LeadTagCreate>,
) -> Result<Json<Value>, AppError> {
    state
        .c2s
        .create_lead_tag(&lead_id, &tag.tag_id)
        .await
        .map(Json)
}

/// POST /leads/:lead_id/mark-interacted
pub async fn mark_lead_interacted(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.c2s.mark_lead_as_interacted(&lead_id).await.map(Json)
}

/// POST /leads/:lead_id/messages
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    Json(message): Json<MessageCreate>,
) -> Result<Json<Value>, AppError> {
    state
        .c2s
        .create_message(&lead_id, &message.message, message.message_type.as_deref())
        .await
        .map(Json)
}

/// POST /leads/:lead_id/visits
pub async fn create_visit(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    Json(visit): Json<VisitCreate>,
) -> Result<Json<Value>, AppError> {
    state
        .c2s
        .create_visit(&lead_id, &visit.visit_date, visit.description.as_deref())
        .await
        .map(Json)
}

/// POST /leads/:lead_id/activities
pub async fn create_activity(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    Json(activity): Json<ActivityCreate>,
) -> Result<Json<Value>, AppError> {
    state
        .c2s
        .create_activity(
            &lead_id,
            &activity.activity_type,
            &activity.description,
            activity.date.as_deref(),
        )
        .await
        .map(Json)
}

/// POST /leads/:lead_id/done-deal
pub async fn mark_done_deal(
    State(state): State<Arc<AppState>>,
    Path(lead_id): Path<String>,
    Json(deal): Json<DoneDeal>,
) -> Result<Json<Value>, AppError> {
    state
        .c2s
        .mark_done_deal(&lead_id, deal.value, deal.description.as_deref())
        .await
        .map(Json)
}

// ========== Tags ==========

/// GET /tags
pub async fn list_tags(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TagQuery>,
) -> Result<Json<Value>, AppError> {
    state
        .c2s
        .get_tags(query.name.as_deref(), query.autofill)
        .await
        .map(Json)
}

/// POST /tags
pub async fn create_tag(
    State(state): State<Arc<AppState>>,
    Json(tag): Json<TagCreate>,
) -> Result<Json<Value>, AppError> {
    state.c2s.create_tag(&tag).await.map(Json)
}

// ========== Sellers ==========

/// GET /sellers
pub async fn list_sellers(State(state): State<Arc<AppState>>) -> Result<Json<Value>, AppError> {
    state.c2s.get_sellers().await.map(Json)
}

/// POST /sellers
pub async fn create_seller(
    State(state): State<Arc<AppState>>,
    Json(seller): Json<SellerCreate>,
) -> Result<Json<Value>, AppError> {
    state.c2s.create_seller(&seller).await.map(Json)
}

/// PUT /sellers/:seller_id
pub async fn update_seller(
    State(state): State<Arc<AppState>>,
    Path(seller_id): Path<String>,
    Json(seller): Json<SellerUpdate>,
) -> Result<Json<Value>, AppError> {
    state.c2s.update_seller(&seller_id, &seller).await.map(Json)
}

// ========== Distribution ==========

/// GET /distribution/queues
pub async fn list_distribution_queues(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    state.c2s.get_distribution_queues().await.map(Json)
}

/// POST /distribution/queues/:queue_id/redistribute
pub async fn redistribute_lead(
    State(state): State<Arc<AppState>>,
    Path(queue_id): Path<String>,
    Json(data): Json<LeadRedistribute>,
) -> Result<Json<Value>, AppError> {
    state
        .c2s
        .redistribute_lead(&queue_id, &data.lead_id, &data.seller_id)
        .await
        .map(Json)
}

/// GET /distribution/queues/:queue_id/sellers
pub async fn get_queue_sellers(
    State(state): State<Arc<AppState>>,
    Path(queue_id): Path<String>,
) -> Result<Json<Value>, AppError> {
    state.c2s.get_queue_sellers(&queue_id).await.map(Json)
}

/// POST /distribution/queues/:queue_id/priority
pub async fn update_seller_priority(
    State(state): State<Arc<AppState>>,
    Path(queue_id): Path<String>,
    Json(data): Json<SellerPriority>,
) -> Result<Json<Value>, AppError> {
    state
        .c2s
        .update_seller_priority(&queue_id, &data.seller_id, data.priority)
        .await
        .map(Json)
}

/// POST /distribution/queues/:queue_id/next-seller
pub async fn set_next_seller(
    State(state): State<Arc<AppState>>,
    Path(queue_id): Path<String>,
    Json(data): Json<NextSeller>,
) -> Result<Json<Value>, AppError> {
    state
        .c2s
        .set_next_seller(&queue_id, &data.seller_id)
        .await
        .map(Json)
}

/// POST /distribution/rules
pub async fn create_distribution_rule(
    State(state): State<Arc<AppState>>,
    Json(rule): Json<DistributionRuleCreate>,
) -> Result<Json<Value>, AppError> {
    state.c2s.create_distribution_rule(&rule).await.map(Json)
}

// ========== Company & Webhooks ==========

/// GET /company/me
pub async fn get_company_info(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    state.c2s.get_me().await.map(Json)
}

/// POST /webhooks/subscribe
pub async fn subscribe_webhook(
    State(state): State<Arc<AppState>>,
    Json(data): Json<WebhookSubscribe>,
) -> Result<Json<Value>, AppError> {
    state
        .c2s
        .subscribe_webhook(&data.url, &data.events)
        .await
        .map(Json)
}

/// POST /webhooks/unsubscribe
pub async fn unsubscribe_webhook(
    State(state): State<Arc<AppState>>,
    Json(data): Json<WebhookUnsubscribe>,
) -> Result<Json<Value>, AppError> {
    state.c2s.unsubscribe_webhook(&data.url).await.map(Json)
}
