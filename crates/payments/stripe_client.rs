use std::time::Duration;

use anyhow::Result;
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use sha2::Sha256;
use tracing::error;

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_STRIPE_API_BASE_URL: &str = "https://api.stripe.com/v1";
pub const EVENT_PAYMENT_INTENT_CREATED: &str = "payment_intent.created";
pub const EVENT_PAYMENT_INTENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const EVENT_PAYMENT_INTENT_FAILED: &str = "payment_intent.payment_failed";

const CURRENCY: &str = "usd";
const PAYMENT_METHOD_TYPE: &str = "card";

/// Minimal Stripe client built on reqwest.
pub struct StripeClient {
    http: reqwest::Client,
    api_base_url: String,
    secret_key: String,
    webhook_secret: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeEvent {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub type_: String,
    pub created: Option<i64>,
    pub data: StripeEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeEventData {
    pub object: serde_json::Value,
}

/// `payment_method` arrives either as an id or as an expanded object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StripePaymentMethodRef {
    Id(String),
    Object { id: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripePaymentIntent {
    pub id: String,
    #[serde(default)]
    pub payment_method: Option<StripePaymentMethodRef>,
}

impl StripePaymentIntent {
    pub fn payment_method_id(&self) -> Option<String> {
        self.payment_method.as_ref().map(|method| match method {
            StripePaymentMethodRef::Id(id) => id.clone(),
            StripePaymentMethodRef::Object { id } => id.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    #[serde(default)]
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct StripeErrorEnvelope {
    error: StripeErrorDetails,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetails {
    #[serde(rename = "type")]
    type_: Option<String>,
    code: Option<String>,
    message: Option<String>,
    decline_code: Option<String>,
}

impl StripeClient {
    pub fn new(
        api_base_url: String,
        secret_key: String,
        webhook_secret: String,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base_url,
            secret_key,
            webhook_secret,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url.trim_end_matches('/'), path)
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let request_id = resp
            .headers()
            .get("request-id")
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        let details = serde_json::from_str::<StripeErrorEnvelope>(&body)
            .ok()
            .map(|envelope| envelope.error);

        error!(
            status = %status,
            stripe_request_id = ?request_id,
            stripe_error_type = ?details.as_ref().and_then(|d| d.type_.clone()),
            stripe_error_code = ?details.as_ref().and_then(|d| d.code.clone()),
            stripe_error_message = ?details.as_ref().and_then(|d| d.message.clone()),
            stripe_decline_code = ?details.as_ref().and_then(|d| d.decline_code.clone()),
            response_body = %body,
            context = %context,
            "stripe api request failed"
        );

        anyhow::bail!(
            "Stripe API request failed: {} (status {}, request_id={:?})",
            context,
            status,
            request_id
        );
    }

    /// Creates a Stripe customer tagged with the platform user id.
    pub async fn create_customer(&self, email: &str, user_id: i64) -> Result<String> {
        let body = [
            ("email", email.to_string()),
            ("metadata[user_id]", user_id.to_string()),
        ];

        let resp = self
            .http
            .post(self.url("/customers"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create customer").await?;

        #[derive(Deserialize)]
        struct CustomerResp {
            id: String,
        }

        let parsed: CustomerResp = resp.json().await?;
        Ok(parsed.id)
    }

    /// USD card payment intent; amount in cents.
    pub async fn create_payment_intent(
        &self,
        customer_id: &str,
        amount: i64,
        description: &str,
    ) -> Result<PaymentIntent> {
        let body = [
            ("customer", customer_id.to_string()),
            ("amount", amount.to_string()),
            ("currency", CURRENCY.to_string()),
            ("payment_method_types[]", PAYMENT_METHOD_TYPE.to_string()),
            ("description", description.to_string()),
        ];

        let resp = self
            .http
            .post(self.url("/payment_intents"))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .form(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "create payment intent").await?;

        let intent: PaymentIntent = resp.json().await?;
        if intent.client_secret.is_empty() {
            anyhow::bail!("Stripe payment intent {} has no client secret", intent.id);
        }
        Ok(intent)
    }

    /// Verifies the webhook signature. https://stripe.com/docs/webhooks/signatures
    pub fn verify_webhook_signature(
        &self,
        payload: &[u8],
        signature_header: &str,
    ) -> Result<StripeEvent> {
        let mut timestamp: Option<&str> = None;
        let mut signatures: Vec<&str> = Vec::new();

        for part in signature_header.split(',') {
            let part = part.trim();
            if let Some(rest) = part.strip_prefix("t=") {
                timestamp = Some(rest);
            } else if let Some(rest) = part.strip_prefix("v1=") {
                signatures.push(rest);
            }
        }

        let timestamp =
            timestamp.ok_or_else(|| anyhow::anyhow!("missing timestamp in stripe-signature"))?;
        if signatures.is_empty() {
            anyhow::bail!("missing v1 in stripe-signature");
        }

        let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
        let matched = signatures.iter().any(|signature| {
            let Ok(provided) = hex::decode(signature) else {
                return false;
            };
            let Ok(mut mac) = HmacSha256::new_from_slice(self.webhook_secret.as_bytes()) else {
                return false;
            };
            mac.update(signed_payload.as_bytes());
            mac.verify_slice(&provided).is_ok()
        });

        if !matched {
            anyhow::bail!("invalid webhook signature");
        }

        let event: StripeEvent = serde_json::from_slice(payload)?;
        Ok(event)
    }

    pub fn extract_payment_intent(event: &StripeEvent) -> Option<StripePaymentIntent> {
        serde_json::from_value(event.data.object.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_string_contains, header, method, path},
    };

    fn client(base_url: String) -> StripeClient {
        StripeClient::new(
            base_url,
            "sk_test".to_string(),
            "whsec_test".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn signature_header(secret: &str, timestamp: &str, payload: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(format!("{timestamp}.{payload}").as_bytes());
        format!("t={timestamp},v1={}", hex::encode(mac.finalize().into_bytes()))
    }

    #[tokio::test]
    async fn payment_intent_is_usd_card_with_description() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment_intents"))
            .and(header("authorization", "Bearer sk_test"))
            .and(body_string_contains("currency=usd"))
            .and(body_string_contains("amount=500"))
            .and(body_string_contains("description=7-Yoga"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "pi_1",
                "client_secret": "pi_1_secret"
            })))
            .mount(&mock_server)
            .await;

        let intent = client(mock_server.uri())
            .create_payment_intent("cus_1", 500, "7-Yoga")
            .await
            .unwrap();

        assert_eq!(intent.id, "pi_1");
        assert_eq!(intent.client_secret, "pi_1_secret");
    }

    #[tokio::test]
    async fn failed_request_surfaces_context() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/customers"))
            .respond_with(ResponseTemplate::new(402).set_body_json(json!({
                "error": { "type": "card_error", "message": "declined" }
            })))
            .mount(&mock_server)
            .await;

        let err = client(mock_server.uri())
            .create_customer("a@b.c", 3)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("create customer"));
    }

    #[test]
    fn verifies_signature_and_extracts_intent() {
        let payload = r#"{"id":"evt_1","type":"payment_intent.succeeded","data":{"object":{"id":"pi_1","payment_method":"pm_9"}}}"#;
        let header = signature_header("whsec_test", "1700000000", payload);

        let event = client(DEFAULT_STRIPE_API_BASE_URL.to_string())
            .verify_webhook_signature(payload.as_bytes(), &header)
            .unwrap();
        let intent = StripeClient::extract_payment_intent(&event).unwrap();

        assert_eq!(event.type_, EVENT_PAYMENT_INTENT_SUCCEEDED);
        assert_eq!(intent.id, "pi_1");
        assert_eq!(intent.payment_method_id().as_deref(), Some("pm_9"));
    }

    #[test]
    fn rejects_signature_from_other_secret() {
        let payload = r#"{"type":"payment_intent.created","data":{"object":{"id":"pi_1"}}}"#;
        let header = signature_header("someone_else", "1700000000", payload);

        assert!(
            client(DEFAULT_STRIPE_API_BASE_URL.to_string())
                .verify_webhook_signature(payload.as_bytes(), &header)
                .is_err()
        );
    }
}
