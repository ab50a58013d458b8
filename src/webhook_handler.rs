use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::Json,
};
use serde_json::Value;

use crate::{
    errors::AppError,
    handlers::AppState,
    models::{GoogleAdsWebhookResponse, RawLeadEvent},
};

/// Google Ads Lead Form webhook handler.
///
/// Flow:
/// 1. Parse the payload leniently (every field may be missing or empty).
/// 2. Deduplicate on lead_id so retries and races do not create duplicate
///    CRM leads.
/// 3. Enrich the event against the campaign mapping table.
/// 4. Forward the enriched record to C2S.
///
/// Enrichment never rejects a lead: unmapped campaigns are forwarded with
/// the fallback body and no product/url keys.
pub async fn google_ads_webhook(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RawLeadEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<GoogleAdsWebhookResponse>), AppError> {
    // Step 1: Lenient parse. Any JSON object is accepted; non-JSON is not.
    let Json(event) = payload.map_err(|rejection| {
        AppError::ValidationError(format!("Invalid webhook payload: {}", rejection))
    })?;

    tracing::info!(
        "📨 Received Google Ads webhook: lead_id={}, campaign={}",
        event.lead_id,
        event.campaign_id
    );

    // Step 2: Deduplicate on lead_id. Events without one cannot be keyed.
    if !event.lead_id.is_empty() {
        if let Some(processing_since) = state.processing_leads_cache.get(&event.lead_id).await {
            let seconds_ago = unix_now() - processing_since;
            tracing::warn!(
                "⏭ Duplicate webhook for lead {} ({}s after first)",
                event.lead_id,
                seconds_ago
            );
            return Ok((
                StatusCode::OK,
                Json(GoogleAdsWebhookResponse {
                    success: true,
                    message: "Lead already being processed (duplicate)".to_string(),
                    lead_id: event.lead_id.clone(),
                    c2s_lead_id: None,
                    enriched: false,
                }),
            ));
        }

        state
            .processing_leads_cache
            .insert(event.lead_id.clone(), unix_now())
            .await;
    }

    // Step 3: Enrich against the mapping table.
    let envelope = state.enricher.enrich_lead(&event).await;
    let enriched = envelope.lead.product.is_some();

    // Step 4: Forward to C2S.
    let response = match state.c2s.create_lead(&envelope).await {
        Ok(response) => response,
        Err(err) => {
            // Unmark the lead so an upstream retry is not swallowed by the
            // dedup window.
            if !event.lead_id.is_empty() {
                state
                    .processing_leads_cache
                    .invalidate(&event.lead_id)
                    .await;
            }
            return Err(err);
        }
    };

    let c2s_lead_id = extract_lead_id(&response);
    match &c2s_lead_id {
        Some(id) => tracing::info!("✅ Lead created in C2S: {}", id),
        None => tracing::info!("✅ Lead forwarded to C2S (no id in response)"),
    }

    let message = if enriched {
        "Lead enriched and forwarded to C2S".to_string()
    } else {
        "Lead forwarded without campaign match".to_string()
    };

    Ok((
        StatusCode::CREATED,
        Json(GoogleAdsWebhookResponse {
            success: true,
            message,
            lead_id: event.lead_id,
            c2s_lead_id,
            enriched,
        }),
    ))
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

/// Pulls the created lead id out of a C2S response.
///
/// C2S returns the id in different places depending on the endpoint
/// version: `data.id`, top-level `id`, or `lead_id`, as either a string
/// or a number.
fn extract_lead_id(response: &Value) -> Option<String> {
    let candidates = [
        response.pointer("/data/id"),
        response.get("id"),
        response.get("lead_id"),
    ];

    candidates.into_iter().flatten().find_map(|v| match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_nested_data_id() {
        let response = json!({"data": {"id": "abc-123"}});
        assert_eq!(extract_lead_id(&response), Some("abc-123".to_string()));
    }

    #[test]
    fn extracts_top_level_string_id() {
        let response = json!({"id": "L-9"});
        assert_eq!(extract_lead_id(&response), Some("L-9".to_string()));
    }

    #[test]
    fn extracts_numeric_id_as_string() {
        let response = json!({"data": {"id": 42}});
        assert_eq!(extract_lead_id(&response), Some("42".to_string()));
    }

    #[test]
    fn falls_back_to_lead_id_key() {
        let response = json!({"lead_id": "xyz"});
        assert_eq!(extract_lead_id(&response), Some("xyz".to_string()));
    }

    #[test]
    fn nested_id_wins_over_top_level() {
        let response = json!({"id": "outer", "data": {"id": "inner"}});
        assert_eq!(extract_lead_id(&response), Some("inner".to_string()));
    }

    #[test]
    fn missing_or_empty_id_yields_none() {
        assert_eq!(extract_lead_id(&json!({"ok": true})), None);
        assert_eq!(extract_lead_id(&json!({"id": ""})), None);
        assert_eq!(extract_lead_id(&json!({"id": null})), None);
    }
}
