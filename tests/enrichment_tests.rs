/// Unit tests for the campaign enrichment pipeline
/// Tests body rendering, product/url key presence, mapping round trips,
/// error types, and lead deduplication caching
use std::io::Write;
use std::sync::Arc;

use c2s_gateway::enrichment::CampaignEnricher;
use c2s_gateway::mapping_store::MappingStore;
use c2s_gateway::models::{CampaignInfo, RawLeadEvent};
use serde_json::json;
use tempfile::NamedTempFile;

/// Helper: mapping table document with the documented reference campaign.
fn scenario_mapping() -> serde_json::Value {
    json!({
        "google_ads_campaigns": {
            "22866487607": {
                "campaign_name": "Campanha X",
                "property": {
                    "description": "Casa X",
                    "prop_ref": "REF1",
                    "price": 500000,
                    "price_display": "R$500.000",
                    "neighbourhood": "Jardim Europa"
                },
                "product_details": {
                    "building_name": "Casa X",
                    "area": "300m2",
                    "bedrooms": "4",
                    "parking": "2",
                    "features": ["Piscina", "Churrasqueira"]
                }
            }
        },
        "default_lead_source": {}
    })
}

/// Helper: write a mapping document to a temp file and build an enricher
/// over it. The file handle must stay alive for the duration of the test.
fn enricher_with_mapping(doc: serde_json::Value) -> (CampaignEnricher, NamedTempFile) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(doc.to_string().as_bytes()).unwrap();
    let store = MappingStore::with_file(file.path()).unwrap();
    (CampaignEnricher::new(Arc::new(store)), file)
}

fn scenario_event() -> RawLeadEvent {
    RawLeadEvent {
        name: "Guilherme Cappi".to_string(),
        email: "g@x.com".to_string(),
        phone: "+5511900000000".to_string(),
        campaign_id: "22866487607".to_string(),
        lead_id: "abc123".to_string(),
        ..Default::default()
    }
}

#[cfg(test)]
mod body_rendering_tests {
    use super::*;

    #[tokio::test]
    async fn test_matched_body_renders_exact_layout() {
        let (enricher, _file) = enricher_with_mapping(scenario_mapping());
        let enriched = enricher.enrich_lead(&scenario_event()).await;

        let expected = [
            "📍 Origem: Google Ads Lead Form Extension",
            "📢 Campanha: Campanha X",
            "🔑 Campaign ID: 22866487607",
            "",
            "🏢 Imóvel: Casa X",
            "📌 Localização: Jardim Europa",
            "📐 Área: 300m2",
            "🛏️  Quartos: 4",
            "🚗 Garagem: 2",
            "💰 Preço: R$500.000",
            "",
            "✨ Destaques:",
            "  • Piscina",
            "  • Churrasqueira",
        ]
        .join("\n");

        assert_eq!(enriched.lead.body, expected);
    }

    #[tokio::test]
    async fn test_fallback_body_renders_exact_layout() {
        let (enricher, _file) = enricher_with_mapping(json!({"google_ads_campaigns": {}}));
        let enriched = enricher.enrich_lead(&scenario_event()).await;

        assert_eq!(
            enriched.lead.body,
            "Lead Form do Google Ads\nCampaign ID: 22866487607\nLead ID: abc123"
        );
    }

    #[tokio::test]
    async fn test_features_render_one_bullet_per_entry_in_order() {
        let mut doc = scenario_mapping();
        doc["google_ads_campaigns"]["22866487607"]["product_details"]["features"] =
            json!(["Vista livre", "Varanda gourmet", "Piscina aquecida"]);

        let (enricher, _file) = enricher_with_mapping(doc);
        let enriched = enricher.enrich_lead(&scenario_event()).await;

        let bullets: Vec<&str> = enriched
            .lead
            .body
            .lines()
            .filter(|line| line.starts_with("  • "))
            .collect();
        assert_eq!(
            bullets,
            vec![
                "  • Vista livre",
                "  • Varanda gourmet",
                "  • Piscina aquecida"
            ]
        );
    }

    #[tokio::test]
    async fn test_no_features_means_no_header_and_no_bullets() {
        let mut doc = scenario_mapping();
        doc["google_ads_campaigns"]["22866487607"]["product_details"]["features"] = json!([]);

        let (enricher, _file) = enricher_with_mapping(doc);
        let enriched = enricher.enrich_lead(&scenario_event()).await;

        assert!(!enriched.lead.body.contains("✨ Destaques:"));
        assert!(!enriched.lead.body.contains("•"));
        assert_eq!(enriched.lead.body.lines().count(), 10);
    }

    #[tokio::test]
    async fn test_partial_mapping_renders_empty_values_without_error() {
        let doc = json!({
            "google_ads_campaigns": {
                "777": { "campaign_name": "Campanha Enxuta" }
            }
        });

        let (enricher, _file) = enricher_with_mapping(doc);
        let event = RawLeadEvent {
            campaign_id: "777".to_string(),
            lead_id: "x1".to_string(),
            ..Default::default()
        };
        let enriched = enricher.enrich_lead(&event).await;

        let body = &enriched.lead.body;
        assert!(body.contains("📢 Campanha: Campanha Enxuta"));
        assert!(body.contains("🏢 Imóvel: "));
        assert!(body.contains("💰 Preço: "));
        assert!(!body.contains("✨ Destaques:"));
    }
}

#[cfg(test)]
mod enrichment_engine_tests {
    use super::*;

    #[tokio::test]
    async fn test_unmatched_campaign_omits_product_and_url_keys() {
        let (enricher, _file) = enricher_with_mapping(json!({"google_ads_campaigns": {}}));
        let enriched = enricher.enrich_lead(&scenario_event()).await;

        // Key presence is the mapped/unmapped signal, so assert on the
        // serialized form, not just the in-memory Options.
        let wire = serde_json::to_value(&enriched).unwrap();
        let lead = wire.get("lead").unwrap().as_object().unwrap();
        assert!(!lead.contains_key("product"));
        assert!(!lead.contains_key("url"));
        assert!(lead.contains_key("customer"));
        assert!(lead.contains_key("body"));
    }

    #[tokio::test]
    async fn test_matched_campaign_fills_product_and_url() {
        let (enricher, _file) = enricher_with_mapping(scenario_mapping());
        let enriched = enricher.enrich_lead(&scenario_event()).await;
        let lead = enriched.lead;

        let product = lead.product.expect("matched lead must carry product");
        assert_eq!(product.description, "Casa X");
        assert_eq!(product.prop_ref, "REF1");
        assert_eq!(product.price, "500000");
        assert_eq!(
            lead.url.as_deref(),
            Some("https://ads.google.com/leads/abc123")
        );
    }

    #[tokio::test]
    async fn test_customer_block_copied_verbatim() {
        let (enricher, _file) = enricher_with_mapping(scenario_mapping());
        let enriched = enricher.enrich_lead(&scenario_event()).await;

        assert_eq!(enriched.lead.customer.name, "Guilherme Cappi");
        assert_eq!(enriched.lead.customer.email, "g@x.com");
        assert_eq!(enriched.lead.customer.phone, "+5511900000000");
    }

    #[tokio::test]
    async fn test_float_price_keeps_decimal_form() {
        let mut doc = scenario_mapping();
        doc["google_ads_campaigns"]["22866487607"]["property"]["price"] = json!(500000.5);

        let (enricher, _file) = enricher_with_mapping(doc);
        let enriched = enricher.enrich_lead(&scenario_event()).await;
        assert_eq!(enriched.lead.product.unwrap().price, "500000.5");
    }

    #[tokio::test]
    async fn test_empty_event_still_produces_complete_record() {
        let (enricher, _file) = enricher_with_mapping(scenario_mapping());
        let enriched = enricher.enrich_lead(&RawLeadEvent::default()).await;
        let lead = enriched.lead;

        assert!(lead.product.is_none());
        assert!(lead.url.is_none());
        assert_eq!(lead.customer.name, "");
        assert_eq!(
            lead.body,
            "Lead Form do Google Ads\nCampaign ID: \nLead ID: "
        );
    }

    #[tokio::test]
    async fn test_enrich_is_idempotent_for_same_event() {
        let (enricher, _file) = enricher_with_mapping(scenario_mapping());
        let event = scenario_event();

        let first = serde_json::to_string(&enricher.enrich_lead(&event).await).unwrap();
        let second = serde_json::to_string(&enricher.enrich_lead(&event).await).unwrap();
        assert_eq!(first, second);
    }
}

#[cfg(test)]
mod mapping_table_tests {
    use super::*;

    #[tokio::test]
    async fn test_add_mapping_then_lookup_returns_equal_info() {
        let (enricher, _file) = enricher_with_mapping(json!({"google_ads_campaigns": {}}));

        let info: CampaignInfo = serde_json::from_value(
            scenario_mapping()["google_ads_campaigns"]["22866487607"].clone(),
        )
        .unwrap();

        enricher
            .add_campaign_mapping("22866487607", info.clone())
            .await
            .unwrap();

        let stored = enricher.campaign_info("22866487607").await.unwrap();
        assert_eq!(stored, info);
        assert_eq!(enricher.campaign_count().await, 1);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_mapping() {
        let (enricher, _file) = enricher_with_mapping(scenario_mapping());

        let replacement = CampaignInfo {
            campaign_name: "Campanha X v2".to_string(),
            ..Default::default()
        };
        enricher
            .add_campaign_mapping("22866487607", replacement)
            .await
            .unwrap();

        let stored = enricher.campaign_info("22866487607").await.unwrap();
        assert_eq!(stored.campaign_name, "Campanha X v2");
        assert_eq!(enricher.campaign_count().await, 1);

        // Enrichment immediately sees the new name.
        let enriched = enricher.enrich_lead(&scenario_event()).await;
        assert!(enriched.lead.body.contains("📢 Campanha: Campanha X v2"));
    }

    #[tokio::test]
    async fn test_lookup_is_case_sensitive_and_exact() {
        let (enricher, _file) = enricher_with_mapping(json!({
            "google_ads_campaigns": { "ABC": { "campaign_name": "Upper" } }
        }));

        assert!(enricher.campaign_info("ABC").await.is_some());
        assert!(enricher.campaign_info("abc").await.is_none());
        assert!(enricher.campaign_info("ABC ").await.is_none());
    }
}

#[cfg(test)]
mod error_handling_tests {
    use c2s_gateway::errors::AppError;
    use c2s_gateway::mapping_store::MappingStore;

    #[test]
    fn test_missing_mapping_file_is_configuration_error() {
        let result = MappingStore::with_file("/nonexistent/campaign_mapping.json");
        assert!(matches!(result, Err(AppError::ConfigurationError(_))));
    }

    #[test]
    fn test_app_error_types() {
        let config_error = AppError::ConfigurationError("mapping file missing".to_string());
        assert!(matches!(config_error, AppError::ConfigurationError(_)));

        let validation_error = AppError::ValidationError("not a JSON object".to_string());
        assert!(matches!(validation_error, AppError::ValidationError(_)));

        let persistence_error = AppError::PersistenceError("disk full".to_string());
        assert!(matches!(persistence_error, AppError::PersistenceError(_)));

        let api_error = AppError::ExternalApiError("C2S timeout".to_string());
        assert!(matches!(api_error, AppError::ExternalApiError(_)));
    }

    #[test]
    fn test_error_display() {
        let error = AppError::PersistenceError("read-only filesystem".to_string());
        let display = format!("{}", error);
        assert!(display.contains("Persistence error"));
        assert!(display.contains("read-only filesystem"));

        let error = AppError::NotFound("No mapping for campaign 1".to_string());
        let display = format!("{}", error);
        assert!(display.contains("Not found"));
        assert!(display.contains("No mapping for campaign 1"));
    }
}

#[cfg(test)]
mod deduplication_tests {
    use moka::future::Cache;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cache_marks_lead_as_processing() {
        let cache: Cache<String, i64> = Cache::builder()
            .time_to_live(Duration::from_secs(60))
            .max_capacity(100)
            .build();

        let lead_id = "lead_abc123".to_string();

        // First event - not in cache
        assert!(cache.get(&lead_id).await.is_none());

        // Mark as processing
        cache.insert(lead_id.clone(), 1).await;

        // Retry - seen as duplicate
        assert_eq!(cache.get(&lead_id).await, Some(1));
    }

    #[tokio::test]
    async fn test_cache_entry_expires_after_ttl() {
        let cache: Cache<String, i64> = Cache::builder()
            .time_to_live(Duration::from_millis(100))
            .max_capacity(100)
            .build();

        cache.insert("short_lived".to_string(), 999).await;
        assert_eq!(cache.get(&"short_lived".to_string()).await, Some(999));

        tokio::time::sleep(Duration::from_millis(150)).await;

        assert_eq!(cache.get(&"short_lived".to_string()).await, None);
    }

    #[tokio::test]
    async fn test_invalidated_lead_can_be_reprocessed() {
        let cache: Cache<String, i64> = Cache::builder()
            .time_to_live(Duration::from_secs(60))
            .max_capacity(100)
            .build();

        cache.insert("lead_retry".to_string(), 5).await;
        cache.invalidate(&"lead_retry".to_string()).await;

        assert!(cache.get(&"lead_retry".to_string()).await.is_none());
    }
}
