//! Loops contact list client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use serif_core::ports::{ContactError, ContactSync};

const LOOPS_API_URL: &str = "https://app.loops.so/api/v1";

#[derive(Debug, Serialize)]
struct ContactRequest<'a> {
    email: &'a str,
    #[serde(rename = "firstName", skip_serializing_if = "Option::is_none")]
    first_name: Option<&'a str>,
}

/// Pushes contacts to the Loops audience over its REST API.
pub struct LoopsContactClient {
    api_key: String,
    base_url: String,
    client: Client,
}

impl LoopsContactClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key,
            base_url: LOOPS_API_URL.to_owned(),
            client,
        }
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }
}

#[async_trait]
impl ContactSync for LoopsContactClient {
    async fn sync_contact(
        &self,
        email: &str,
        first_name: Option<&str>,
    ) -> Result<(), ContactError> {
        let body = ContactRequest { email, first_name };

        let response = self
            .client
            .post(format!("{}/contacts/create", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ContactError::Upstream(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_owned());
            return Err(ContactError::Upstream(format!(
                "Contact API error ({status}): {detail}"
            )));
        }

        tracing::info!(contact_email = %email, "Contact synced");
        Ok(())
    }
}

/// No-op stand-in used when no API key is configured. Every call reports
/// the integration as disabled so callers can surface that upstream.
pub struct DisabledContactSync;

#[async_trait]
impl ContactSync for DisabledContactSync {
    async fn sync_contact(&self, email: &str, _: Option<&str>) -> Result<(), ContactError> {
        tracing::warn!(contact_email = %email, "Contact sync skipped: no API key configured");
        Err(ContactError::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_body_uses_the_wire_field_names() {
        let body = ContactRequest {
            email: "ada@example.com",
            first_name: Some("Ada"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["email"], "ada@example.com");
        assert_eq!(json["firstName"], "Ada");
    }

    #[test]
    fn request_body_omits_a_missing_first_name() {
        let body = ContactRequest {
            email: "ada@example.com",
            first_name: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("firstName").is_none());
    }

    #[tokio::test]
    async fn disabled_sync_reports_disabled() {
        let result = DisabledContactSync
            .sync_contact("ada@example.com", None)
            .await;
        assert!(matches!(result, Err(ContactError::Disabled)));
    }
}
