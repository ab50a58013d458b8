use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ============ Campaign Mapping Models ============

/// Property listing details attached to a mapped campaign.
///
/// Every field is optional in the mapping file; absent fields render as
/// empty strings downstream, never as null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    /// Short listing description (e.g., "Casa X").
    #[serde(default)]
    pub description: String,
    /// Internal property reference code.
    #[serde(default)]
    pub prop_ref: String,
    /// Listing price as a plain number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<serde_json::Number>,
    /// Human-formatted price (e.g., "R$500.000").
    #[serde(default)]
    pub price_display: String,
    /// Neighbourhood name.
    #[serde(default)]
    pub neighbourhood: String,
}

/// Product-level details used to build the lead message body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    /// Building or development name.
    #[serde(default)]
    pub building_name: String,
    /// Built area (free-form, e.g., "300m2").
    #[serde(default)]
    pub area: String,
    /// Bedroom count (free-form string in the mapping).
    #[serde(default)]
    pub bedrooms: String,
    /// Parking spot count (free-form string in the mapping).
    #[serde(default)]
    pub parking: String,
    /// Highlight features, rendered as bullets in mapping order.
    #[serde(default)]
    pub features: Vec<String>,
}

/// One mapped campaign's metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignInfo {
    /// Campaign display name.
    #[serde(default)]
    pub campaign_name: String,
    /// Property listing attached to the campaign.
    #[serde(default)]
    pub property: PropertyInfo,
    /// Product details attached to the campaign.
    #[serde(default)]
    pub product_details: ProductDetails,
}

/// The whole persisted mapping document.
///
/// Campaign identifiers are unique keys; lookups are case-sensitive exact
/// matches. `BTreeMap` keeps rewrites byte-stable for an unchanged table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingTable {
    /// Campaign identifier -> campaign metadata.
    #[serde(default)]
    pub google_ads_campaigns: BTreeMap<String, CampaignInfo>,
    /// Default lead source record. Unused by the transformation logic but
    /// preserved verbatim across rewrites.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub default_lead_source: Value,
    /// Any other top-level keys, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

// ============ Lead Event Models ============

/// Inbound Google Ads Lead Form payload.
///
/// All fields are free-form strings and any may be missing or empty;
/// `campaign_id` is the sole join key against the mapping table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLeadEvent {
    /// Customer name.
    #[serde(default)]
    pub name: String,
    /// Customer email.
    #[serde(default)]
    pub email: String,
    /// Customer phone.
    #[serde(default)]
    pub phone: String,
    /// Free-text description supplied by the form.
    #[serde(default)]
    pub description: String,
    /// Ad group display name, if the source resolved one.
    #[serde(default)]
    pub adgroup_name: String,
    /// Opaque campaign identifier.
    #[serde(default)]
    pub campaign_id: String,
    /// Opaque lead identifier assigned by the ad platform.
    #[serde(default)]
    pub lead_id: String,
}

/// Customer block of an enriched lead. Always present, fields default to "".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadCustomer {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Product block of an enriched lead. Present only for matched campaigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadProduct {
    /// Listing description from the mapping.
    pub description: String,
    /// Property reference code from the mapping.
    pub prop_ref: String,
    /// Listing price coerced to its plain string form ("" when unmapped).
    pub price: String,
}

/// The enriched lead record produced by the Campaign Enrichment Engine.
///
/// `product` and `url` are serialized only when the campaign matched;
/// downstream consumers distinguish mapped from unmapped leads by key
/// presence, not by empty values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedLead {
    /// Customer contact block, copied from the raw event.
    pub customer: LeadCustomer,
    /// Property/product block, only for matched campaigns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<LeadProduct>,
    /// Rendered human-readable message body.
    pub body: String,
    /// External lead reference URL, only for matched campaigns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Wire envelope for the enriched record (nested under `lead` by convention).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedLeadEnvelope {
    pub lead: EnrichedLead,
}

/// Response returned by the Google Ads webhook endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleAdsWebhookResponse {
    /// Whether the lead was accepted and forwarded.
    pub success: bool,
    /// Human-readable status message.
    pub message: String,
    /// Lead identifier echoed from the inbound event.
    pub lead_id: String,
    /// Identifier assigned by C2S, when the forward succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c2s_lead_id: Option<String>,
    /// Whether the campaign was found in the mapping table.
    pub enriched: bool,
}

// ============ C2S Pass-through Models ============

/// Schema for creating a lead directly through the pass-through API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadCreate {
    /// Customer name.
    pub customer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seller_id: Option<String>,
}

/// Schema for updating lead information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Schema for forwarding a lead to another seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadForward {
    pub seller_id: String,
}

/// Query parameters accepted by the lead listing route.
#[derive(Debug, Clone, Deserialize)]
pub struct LeadQuery {
    #[serde(default = "LeadQuery::default_page")]
    pub page: u32,
    #[serde(default = "LeadQuery::default_perpage")]
    pub perpage: u32,
    /// Sort field: -created_at, created_at, -updated_at, updated_at.
    pub sort: Option<String>,
    pub created_gte: Option<String>,
    pub created_lt: Option<String>,
    pub updated_gte: Option<String>,
    pub updated_lt: Option<String>,
    pub status: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub tags: Option<String>,
}

impl Default for LeadQuery {
    fn default() -> Self {
        Self {
            page: Self::default_page(),
            perpage: Self::default_perpage(),
            sort: None,
            created_gte: None,
            created_lt: None,
            updated_gte: None,
            updated_lt: None,
            status: None,
            phone: None,
            email: None,
            tags: None,
        }
    }
}

impl LeadQuery {
    fn default_page() -> u32 {
        1
    }

    fn default_perpage() -> u32 {
        50
    }

    /// Flattens the query into key/value pairs for the upstream request,
    /// skipping unset filters. C2S caps page size at 50.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("perpage", self.perpage.min(50).to_string()),
        ];
        let optional = [
            ("sort", &self.sort),
            ("created_gte", &self.created_gte),
            ("created_lt", &self.created_lt),
            ("updated_gte", &self.updated_gte),
            ("updated_lt", &self.updated_lt),
            ("status", &self.status),
            ("phone", &self.phone),
            ("email", &self.email),
            ("tags", &self.tags),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                params.push((key, value.clone()));
            }
        }
        params
    }
}

/// Schema for creating a message on a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreate {
    pub message: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
}

/// Schema for registering a visit on a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitCreate {
    /// Visit date (ISO 8601), passed through as-is.
    pub visit_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Schema for registering an activity on a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityCreate {
    #[serde(rename = "type")]
    pub activity_type: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Schema for marking a deal as done.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoneDeal {
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Schema for creating a tag.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autofill: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Schema for attaching a tag to a lead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadTagCreate {
    pub tag_id: String,
}

/// Query parameters for the tag listing route.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagQuery {
    pub name: Option<String>,
    pub autofill: Option<bool>,
}

/// Schema for creating a seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerCreate {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Schema for updating a seller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Schema for redistributing a lead inside a distribution queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadRedistribute {
    pub lead_id: String,
    pub seller_id: String,
}

/// Schema for updating a seller's priority inside a queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerPriority {
    pub seller_id: String,
    pub priority: u32,
}

/// Schema for forcing the next seller in a queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextSeller {
    pub seller_id: String,
}

/// Schema for creating a distribution rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionRuleCreate {
    pub name: String,
    pub queue_id: String,
    pub conditions: Value,
    pub actions: Value,
}

/// Schema for subscribing a webhook upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookSubscribe {
    pub url: String,
    pub events: Vec<String>,
}

/// Schema for unsubscribing a webhook upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookUnsubscribe {
    pub url: String,
}

/// Query parameters for the ad-metadata resolver proxy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResolveSourceQuery {
    pub form_id: Option<String>,
    pub ad_group_id: Option<String>,
    pub campaign_id: Option<String>,
    pub google_lead_id: Option<String>,
}

impl ResolveSourceQuery {
    /// Flattens the set identifiers into query pairs for the resolver call.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        let optional = [
            ("form_id", &self.form_id),
            ("ad_group_id", &self.ad_group_id),
            ("campaign_id", &self.campaign_id),
            ("google_lead_id", &self.google_lead_id),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                params.push((key, value.clone()));
            }
        }
        params
    }
}
