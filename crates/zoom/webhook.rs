use anyhow::{Result, bail};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use super::payloads::MeetingOccurrence;

type HmacSha256 = Hmac<Sha256>;

pub const EVENT_URL_VALIDATION: &str = "endpoint.url_validation";
pub const EVENT_MEETING_CREATED: &str = "meeting.created";
pub const EVENT_MEETING_UPDATED: &str = "meeting.updated";
pub const EVENT_MEETING_DELETED: &str = "meeting.deleted";
pub const EVENT_APP_DEAUTHORIZED: &str = "app_deauthorized";

const SIGNATURE_VERSION: &str = "v0";

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub account_id: String,
    #[serde(default)]
    pub object: Option<WebhookObject>,
    #[serde(rename = "plainToken", default)]
    pub plain_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookObject {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub meeting_type: i64,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub occurrences: Vec<MeetingOccurrence>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlValidationResponse {
    #[serde(rename = "plainToken")]
    pub plain_token: String,
    #[serde(rename = "encryptedToken")]
    pub encrypted_token: String,
}

fn sign(secret: &str, message: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Checks `x-zm-signature` against `v0:{timestamp}:{body}`.
pub fn verify_signature(secret: &str, timestamp: &str, body: &[u8], signature: &str) -> Result<()> {
    let provided = signature
        .strip_prefix(&format!("{SIGNATURE_VERSION}="))
        .ok_or_else(|| anyhow::anyhow!("unsupported zoom signature version"))?;
    let provided = hex::decode(provided)?;

    let message = format!(
        "{SIGNATURE_VERSION}:{timestamp}:{}",
        String::from_utf8_lossy(body)
    );
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())?;
    mac.update(message.as_bytes());

    if mac.verify_slice(&provided).is_err() {
        bail!("invalid zoom webhook signature");
    }
    Ok(())
}

pub fn url_validation_response(secret: &str, plain_token: &str) -> Result<UrlValidationResponse> {
    Ok(UrlValidationResponse {
        plain_token: plain_token.to_string(),
        encrypted_token: sign(secret, plain_token)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature_for(secret: &str, timestamp: &str, body: &str) -> String {
        format!(
            "v0={}",
            sign(secret, &format!("v0:{timestamp}:{body}")).unwrap()
        )
    }

    #[test]
    fn accepts_matching_signature() {
        let body = r#"{"event":"meeting.deleted"}"#;
        let signature = signature_for("whsec", "1700000000", body);

        assert!(verify_signature("whsec", "1700000000", body.as_bytes(), &signature).is_ok());
    }

    #[test]
    fn rejects_tampered_body_and_wrong_version() {
        let signature = signature_for("whsec", "1700000000", r#"{"a":1}"#);

        assert!(verify_signature("whsec", "1700000000", br#"{"a":2}"#, &signature).is_err());
        let v1 = signature.replacen("v0=", "v1=", 1);
        assert!(verify_signature("whsec", "1700000000", br#"{"a":1}"#, &v1).is_err());
    }

    #[test]
    fn url_validation_echoes_plain_token_with_hex_hmac() {
        let response = url_validation_response("whsec", "abc").unwrap();

        assert_eq!(response.plain_token, "abc");
        assert_eq!(response.encrypted_token.len(), 64);
        assert_eq!(response.encrypted_token, sign("whsec", "abc").unwrap());
    }

    #[test]
    fn parses_meeting_event_payload() {
        let event: WebhookEvent = serde_json::from_str(
            r#"{
                "event": "meeting.updated",
                "payload": {
                    "account_id": "acc-1",
                    "object": { "id": 42, "type": 2, "topic": "Yoga" }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(event.event, EVENT_MEETING_UPDATED);
        assert_eq!(event.payload.account_id, "acc-1");
        assert_eq!(event.payload.object.map(|o| o.id), Some(42));
    }
}
