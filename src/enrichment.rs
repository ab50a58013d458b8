use crate::errors::AppError;
use crate::mapping_store::MappingStore;
use crate::models::{
    CampaignInfo, EnrichedLead, EnrichedLeadEnvelope, LeadCustomer, LeadProduct, RawLeadEvent,
};
use crate::templates;
use std::sync::Arc;

/// External reference URL prefix for Google Ads leads.
const LEAD_URL_PREFIX: &str = "https://ads.google.com/leads/";

/// Campaign Enrichment Engine.
///
/// Turns a sparse Google Ads lead event into a structured record ready for
/// C2S: customer block copied as-is, property/product details joined in from
/// the mapping table, and a rendered message body. The mapping store is
/// injected; the engine holds no other state.
pub struct CampaignEnricher {
    store: Arc<MappingStore>,
}

impl CampaignEnricher {
    pub fn new(store: Arc<MappingStore>) -> Self {
        Self { store }
    }

    /// Enriches one lead event. Never fails on a well-formed event: missing
    /// fields degrade to empty strings and an unmapped campaign takes the
    /// fallback path.
    ///
    /// `product` and `url` are set only when the campaign matched. Their key
    /// presence is how downstream consumers tell mapped from unmapped leads,
    /// so the unmatched path omits them rather than filling defaults.
    pub async fn enrich_lead(&self, event: &RawLeadEvent) -> EnrichedLeadEnvelope {
        let campaign_info = self.store.get(&event.campaign_id).await;

        let customer = LeadCustomer {
            name: event.name.clone(),
            email: event.email.clone(),
            phone: event.phone.clone(),
        };

        let body = templates::render(&event.campaign_id, campaign_info.as_ref(), &event.lead_id);

        let (product, url) = match &campaign_info {
            Some(info) => {
                let product = LeadProduct {
                    description: info.property.description.clone(),
                    prop_ref: info.property.prop_ref.clone(),
                    price: info
                        .property
                        .price
                        .as_ref()
                        .map(|price| price.to_string())
                        .unwrap_or_default(),
                };
                let url = format!("{}{}", LEAD_URL_PREFIX, event.lead_id);
                (Some(product), Some(url))
            }
            None => (None, None),
        };

        tracing::debug!(
            campaign_id = %event.campaign_id,
            lead_id = %event.lead_id,
            matched = campaign_info.is_some(),
            "Lead enriched"
        );

        EnrichedLeadEnvelope {
            lead: EnrichedLead {
                customer,
                product,
                body,
                url,
            },
        }
    }

    /// Read-only campaign lookup for the admin surface.
    pub async fn campaign_info(&self, campaign_id: &str) -> Option<CampaignInfo> {
        self.store.get(campaign_id).await
    }

    /// Inserts or updates one campaign mapping and persists the table.
    pub async fn add_campaign_mapping(
        &self,
        campaign_id: &str,
        info: CampaignInfo,
    ) -> Result<(), AppError> {
        self.store.upsert(campaign_id, info).await
    }

    /// Mapped campaign count, surfaced by the health endpoint.
    pub async fn campaign_count(&self) -> usize {
        self.store.campaign_count().await
    }
}
