use crate::errors::AppError;
use crate::models::LeadQuery;
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Client for the Contact2Sale integration API.
///
/// A stateless call-forwarding layer: every method maps one-to-one onto a
/// C2S endpoint and returns the upstream JSON untouched. Single attempt per
/// call, client-level timeout, no retry policy.
#[derive(Clone)]
pub struct C2sClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl C2sClient {
    /// Creates a new `C2sClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the C2S API (no trailing slash).
    /// * `token` - The API token for authentication.
    pub fn new(base_url: String, token: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AppError::ExternalApiError(format!("Failed to create C2S client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// Sends one request to the C2S API and decodes the JSON response.
    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<&[(&str, String)]>,
        body: Option<Value>,
    ) -> Result<Value, AppError> {
        let url = format!("{}{}", self.base_url, endpoint);
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, &url)
            .header("Authorization", format!("Bearer {}", self.token));
        if let Some(params) = params {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::ExternalApiError(format!("C2S request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::ExternalApiError(format!(
                "C2S returned {}: {}",
                status, error_text
            )));
        }

        response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse C2S response: {}", e))
        })
    }

    fn encode<T: Serialize>(payload: &T) -> Result<Value, AppError> {
        serde_json::to_value(payload)
            .map_err(|e| AppError::InternalError(format!("Failed to encode request body: {}", e)))
    }

    // ========== Leads ==========

    /// Lists leads with filtering and pagination.
    pub async fn get_leads(&self, query: &LeadQuery) -> Result<Value, AppError> {
        let params = query.to_query();
        self.request(Method::GET, "/integration/leads", Some(&params), None)
            .await
    }

    /// Gets one lead by id.
    pub async fn get_lead(&self, lead_id: &str) -> Result<Value, AppError> {
        self.request(
            Method::GET,
            &format!("/integration/leads/{}", lead_id),
            None,
            None,
        )
        .await
    }

    /// Creates a new lead. Accepts any serializable payload so both the
    /// pass-through route and the enriched-lead envelope go through here.
    pub async fn create_lead<T: Serialize>(&self, lead_data: &T) -> Result<Value, AppError> {
        tracing::info!("Creating new lead in C2S");
        let body = Self::encode(lead_data)?;
        self.request(Method::POST, "/integration/leads", None, Some(body))
            .await
    }

    /// Updates lead information.
    pub async fn update_lead<T: Serialize>(
        &self,
        lead_id: &str,
        lead_data: &T,
    ) -> Result<Value, AppError> {
        let body = Self::encode(lead_data)?;
        self.request(
            Method::PATCH,
            &format!("/integration/leads/{}", lead_id),
            None,
            Some(body),
        )
        .await
    }

    /// Transfers a lead to another seller.
    pub async fn forward_lead(&self, lead_id: &str, seller_id: &str) -> Result<Value, AppError> {
        self.request(
            Method::PATCH,
            &format!("/integration/leads/{}/forward", lead_id),
            None,
            Some(json!({ "seller_id": seller_id })),
        )
        .await
    }

    /// Gets tags associated with a lead.
    pub async fn get_lead_tags(&self, lead_id: &str) -> Result<Value, AppError> {
        self.request(
            Method::GET,
            &format!("/integration/leads/{}/tags", lead_id),
            None,
            None,
        )
        .await
    }

    /// Associates a tag with a lead.
    pub async fn create_lead_tag(&self, lead_id: &str, tag_id: &str) -> Result<Value, AppError> {
        self.request(
            Method::POST,
            &format!("/integration/leads/{}/create_tag", lead_id),
            None,
            Some(json!({ "tag_id": tag_id })),
        )
        .await
    }

    /// Marks a lead as interacted.
    pub async fn mark_lead_as_interacted(&self, lead_id: &str) -> Result<Value, AppError> {
        self.request(
            Method::POST,
            &format!("/integration/leads/{}/mark_as_interacted", lead_id),
            None,
            None,
        )
        .await
    }

    // ========== Messages & Activities ==========

    /// Adds a message to a lead.
    pub async fn create_message(
        &self,
        lead_id: &str,
        message: &str,
        message_type: Option<&str>,
    ) -> Result<Value, AppError> {
        let mut data = json!({ "message": message });
        if let Some(message_type) = message_type {
            data["type"] = json!(message_type);
        }
        self.request(
            Method::POST,
            &format!("/integration/leads/{}/create_message", lead_id),
            None,
            Some(data),
        )
        .await
    }

    /// Marks a lead as a closed deal.
    pub async fn mark_done_deal(
        &self,
        lead_id: &str,
        value: f64,
        description: Option<&str>,
    ) -> Result<Value, AppError> {
        let mut data = json!({ "value": value });
        if let Some(description) = description {
            data["description"] = json!(description);
        }
        self.request(
            Method::POST,
            &format!("/integration/leads/{}/done_deal", lead_id),
            None,
            Some(data),
        )
        .await
    }

    /// Schedules a visit for a lead.
    pub async fn create_visit(
        &self,
        lead_id: &str,
        visit_date: &str,
        description: Option<&str>,
    ) -> Result<Value, AppError> {
        let mut data = json!({ "visit_date": visit_date });
        if let Some(description) = description {
            data["description"] = json!(description);
        }
        self.request(
            Method::POST,
            &format!("/integration/leads/{}/create_visit", lead_id),
            None,
            Some(data),
        )
        .await
    }

    /// Logs an activity on a lead.
    pub async fn create_activity(
        &self,
        lead_id: &str,
        activity_type: &str,
        description: &str,
        date: Option<&str>,
    ) -> Result<Value, AppError> {
        let mut data = json!({ "type": activity_type, "description": description });
        if let Some(date) = date {
            data["date"] = json!(date);
        }
        self.request(
            Method::POST,
            &format!("/integration/leads/{}/create_activity", lead_id),
            None,
            Some(data),
        )
        .await
    }

    // ========== Tags ==========

    /// Creates a company tag.
    pub async fn create_tag<T: Serialize>(&self, tag_data: &T) -> Result<Value, AppError> {
        let body = Self::encode(tag_data)?;
        self.request(Method::POST, "/integration/tags", None, Some(body))
            .await
    }

    /// Lists tags with optional filters.
    pub async fn get_tags(
        &self,
        name: Option<&str>,
        autofill: Option<bool>,
    ) -> Result<Value, AppError> {
        let mut params = Vec::new();
        if let Some(name) = name {
            params.push(("name", name.to_string()));
        }
        if let Some(autofill) = autofill {
            params.push(("autofill", autofill.to_string()));
        }
        self.request(Method::GET, "/integration/tags", Some(&params), None)
            .await
    }

    // ========== Sellers ==========

    /// Lists all sellers.
    pub async fn get_sellers(&self) -> Result<Value, AppError> {
        self.request(Method::GET, "/integration/sellers", None, None)
            .await
    }

    /// Creates a new seller.
    pub async fn create_seller<T: Serialize>(&self, seller_data: &T) -> Result<Value, AppError> {
        let body = Self::encode(seller_data)?;
        self.request(Method::POST, "/integration/sellers", None, Some(body))
            .await
    }

    /// Updates a seller's configuration.
    pub async fn update_seller<T: Serialize>(
        &self,
        seller_id: &str,
        seller_data: &T,
    ) -> Result<Value, AppError> {
        let body = Self::encode(seller_data)?;
        self.request(
            Method::PUT,
            &format!("/integration/sellers/{}", seller_id),
            None,
            Some(body),
        )
        .await
    }

    // ========== Distribution ==========

    /// Lists all distribution queues.
    pub async fn get_distribution_queues(&self) -> Result<Value, AppError> {
        self.request(Method::GET, "/integration/distribution_queues", None, None)
            .await
    }

    /// Reassigns a lead inside a distribution queue.
    pub async fn redistribute_lead(
        &self,
        queue_id: &str,
        lead_id: &str,
        seller_id: &str,
    ) -> Result<Value, AppError> {
        self.request(
            Method::POST,
            &format!("/integration/distribution_queues/{}/redistribute", queue_id),
            None,
            Some(json!({ "lead_id": lead_id, "seller_id": seller_id })),
        )
        .await
    }

    /// Gets the sellers of a distribution queue.
    pub async fn get_queue_sellers(&self, queue_id: &str) -> Result<Value, AppError> {
        self.request(
            Method::GET,
            &format!("/integration/distribution_queues/{}/sellers", queue_id),
            None,
            None,
        )
        .await
    }

    /// Updates a seller's priority inside a queue.
    pub async fn update_seller_priority(
        &self,
        queue_id: &str,
        seller_id: &str,
        priority: u32,
    ) -> Result<Value, AppError> {
        self.request(
            Method::POST,
            &format!("/integration/distribution_queues/{}/priority", queue_id),
            None,
            Some(json!({ "seller_id": seller_id, "priority": priority })),
        )
        .await
    }

    /// Defines the next seller in a queue.
    pub async fn set_next_seller(
        &self,
        queue_id: &str,
        seller_id: &str,
    ) -> Result<Value, AppError> {
        self.request(
            Method::POST,
            &format!("/integration/distribution_queues/{}/next_seller", queue_id),
            None,
            Some(json!({ "seller_id": seller_id })),
        )
        .await
    }

    /// Creates a distribution rule.
    pub async fn create_distribution_rule<T: Serialize>(
        &self,
        rule_data: &T,
    ) -> Result<Value, AppError> {
        let body = Self::encode(rule_data)?;
        self.request(
            Method::POST,
            "/integration/distribution_rules",
            None,
            Some(body),
        )
        .await
    }

    // ========== Company & Webhooks ==========

    /// Gets the authenticated company details and sub-companies.
    pub async fn get_me(&self) -> Result<Value, AppError> {
        self.request(Method::GET, "/integration/me", None, None)
            .await
    }

    /// Subscribes a callback URL to lead events.
    pub async fn subscribe_webhook(
        &self,
        webhook_url: &str,
        events: &[String],
    ) -> Result<Value, AppError> {
        self.request(
            Method::POST,
            "/integration/webhook/leads/subscribe",
            None,
            Some(json!({ "url": webhook_url, "events": events })),
        )
        .await
    }

    /// Unsubscribes a callback URL from lead events.
    pub async fn unsubscribe_webhook(&self, webhook_url: &str) -> Result<Value, AppError> {
        self.request(
            Method::POST,
            "/integration/webhook/leads/unsubscribe",
            None,
            Some(json!({ "url": webhook_url })),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_client_creation() {
        let client = C2sClient::new("https://example.com".to_string(), "token".to_string());
        assert!(client.is_ok());
    }
}
