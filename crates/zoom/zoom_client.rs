use std::time::Duration;

use anyhow::Result;
use reqwest::{StatusCode, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::error;
use url::Url;

use super::payloads::{
    CreateMeetingRequest, CreatedMeeting, MeetingInfo, MeetingListPage, OAuthToken,
    UpdateMeetingRequest, ZoomUser,
};

pub const MEETINGS_PAGE_SIZE: i64 = 300;

#[derive(Debug, Error)]
pub enum ZoomApiError {
    #[error("zoom {context} returned status {status}: {body}")]
    Status {
        context: &'static str,
        status: u16,
        body: String,
    },
    #[error("zoom {context} request failed: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("zoom {context} returned an unreadable body: {source}")]
    Decode {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("zoom oauth response has an empty access token")]
    EmptyAccessToken,
}

impl ZoomApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ZoomApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
    }

    /// A body that failed to parse once will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, ZoomApiError::Decode { .. })
    }
}

type ZoomResult<T> = std::result::Result<T, ZoomApiError>;

#[derive(Debug, Clone)]
pub struct ZoomClientConfig {
    pub api_base_url: String,
    pub oauth_base_url: String,
    pub client_key: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub timeout: Duration,
}

/// Thin client over the Zoom REST API and OAuth endpoints. Single attempt per
/// call; callers decide about retries.
pub struct ZoomClient {
    http: reqwest::Client,
    config: ZoomClientConfig,
}

impl ZoomClient {
    pub fn new(config: ZoomClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.config.api_base_url.trim_end_matches('/'), path)
    }

    fn oauth_url(&self, path: &str) -> String {
        format!("{}{}", self.config.oauth_base_url.trim_end_matches('/'), path)
    }

    async fn ensure_success(
        resp: reqwest::Response,
        expected: Option<StatusCode>,
        context: &'static str,
    ) -> ZoomResult<reqwest::Response> {
        let status = resp.status();
        let accepted = match expected {
            Some(expected) => status == expected,
            None => status.is_success(),
        };
        if accepted {
            return Ok(resp);
        }

        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            response_body = %body,
            context = %context,
            "zoom api request failed"
        );

        Err(ZoomApiError::Status {
            context,
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(
        resp: reqwest::Response,
        context: &'static str,
    ) -> ZoomResult<T> {
        let body = resp
            .text()
            .await
            .map_err(|source| ZoomApiError::Transport { context, source })?;
        serde_json::from_str(&body).map_err(|source| ZoomApiError::Decode { context, source })
    }

    /// Consent screen URL; `state` comes back on the OAuth callback.
    pub fn install_url(&self, state: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &self.oauth_url("/oauth/authorize"),
            &[
                ("client_id", self.config.client_key.as_str()),
                ("response_type", "code"),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("state", state),
            ],
        )?;
        Ok(url.to_string())
    }

    pub async fn create_meeting(
        &self,
        access_token: &str,
        request: &CreateMeetingRequest,
    ) -> ZoomResult<CreatedMeeting> {
        const CONTEXT: &str = "create meeting";
        let resp = self
            .http
            .post(self.api_url("/users/me/meetings"))
            .bearer_auth(access_token)
            .json(request)
            .send()
            .await
            .map_err(|source| ZoomApiError::Transport {
                context: CONTEXT,
                source,
            })?;
        let resp = Self::ensure_success(resp, Some(StatusCode::CREATED), CONTEXT).await?;
        Self::decode(resp, CONTEXT).await
    }

    pub async fn update_meeting(
        &self,
        access_token: &str,
        meeting_id: i64,
        occurrence_id: Option<&str>,
        request: &UpdateMeetingRequest,
    ) -> ZoomResult<()> {
        const CONTEXT: &str = "update meeting";
        let mut builder = self
            .http
            .patch(self.api_url(&format!("/meetings/{meeting_id}")))
            .bearer_auth(access_token)
            .json(request);
        if let Some(occurrence_id) = occurrence_id {
            builder = builder.query(&[("occurrence_id", occurrence_id)]);
        }

        let resp = builder
            .send()
            .await
            .map_err(|source| ZoomApiError::Transport {
                context: CONTEXT,
                source,
            })?;
        Self::ensure_success(resp, Some(StatusCode::NO_CONTENT), CONTEXT).await?;
        Ok(())
    }

    pub async fn delete_meeting(
        &self,
        access_token: &str,
        meeting_id: i64,
        occurrence_id: Option<&str>,
    ) -> ZoomResult<()> {
        const CONTEXT: &str = "delete meeting";
        let mut builder = self
            .http
            .delete(self.api_url(&format!("/meetings/{meeting_id}")))
            .bearer_auth(access_token);
        if let Some(occurrence_id) = occurrence_id {
            builder = builder.query(&[("occurrence_id", occurrence_id)]);
        }

        let resp = builder
            .send()
            .await
            .map_err(|source| ZoomApiError::Transport {
                context: CONTEXT,
                source,
            })?;
        Self::ensure_success(resp, Some(StatusCode::NO_CONTENT), CONTEXT).await?;
        Ok(())
    }

    pub async fn get_meeting(&self, access_token: &str, meeting_id: i64) -> ZoomResult<MeetingInfo> {
        const CONTEXT: &str = "get meeting";
        let resp = self
            .http
            .get(self.api_url(&format!("/meetings/{meeting_id}")))
            .bearer_auth(access_token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(|source| ZoomApiError::Transport {
                context: CONTEXT,
                source,
            })?;
        let resp = Self::ensure_success(resp, None, CONTEXT).await?;
        Self::decode(resp, CONTEXT).await
    }

    pub async fn list_upcoming_meetings(
        &self,
        access_token: &str,
        page_number: i64,
    ) -> ZoomResult<MeetingListPage> {
        const CONTEXT: &str = "list meetings";
        let resp = self
            .http
            .get(self.api_url("/users/me/meetings"))
            .bearer_auth(access_token)
            .query(&[
                ("type", "upcoming".to_string()),
                ("page_size", MEETINGS_PAGE_SIZE.to_string()),
                ("page_number", page_number.to_string()),
            ])
            .send()
            .await
            .map_err(|source| ZoomApiError::Transport {
                context: CONTEXT,
                source,
            })?;
        let resp = Self::ensure_success(resp, Some(StatusCode::OK), CONTEXT).await?;
        Self::decode(resp, CONTEXT).await
    }

    pub async fn current_user(&self, access_token: &str) -> ZoomResult<ZoomUser> {
        const CONTEXT: &str = "get current user";
        let resp = self
            .http
            .get(self.api_url("/users/me"))
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|source| ZoomApiError::Transport {
                context: CONTEXT,
                source,
            })?;
        let resp = Self::ensure_success(resp, None, CONTEXT).await?;
        Self::decode(resp, CONTEXT).await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> ZoomResult<OAuthToken> {
        self.request_token(
            &[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ],
            "refresh token",
        )
        .await
    }

    pub async fn exchange_code(&self, code: &str) -> ZoomResult<OAuthToken> {
        self.request_token(
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ],
            "exchange authorization code",
        )
        .await
    }

    async fn request_token(
        &self,
        params: &[(&str, &str)],
        context: &'static str,
    ) -> ZoomResult<OAuthToken> {
        let resp = self
            .http
            .post(self.oauth_url("/oauth/token"))
            .basic_auth(&self.config.client_key, Some(&self.config.client_secret))
            .query(params)
            .send()
            .await
            .map_err(|source| ZoomApiError::Transport { context, source })?;
        let resp = Self::ensure_success(resp, None, context).await?;
        let token: OAuthToken = Self::decode(resp, context).await?;
        if token.access_token.is_empty() {
            return Err(ZoomApiError::EmptyAccessToken);
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zoom::payloads::MeetingSettings;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    fn client_for(server: &MockServer) -> ZoomClient {
        ZoomClient::new(ZoomClientConfig {
            api_base_url: format!("{}/v2", server.uri()),
            oauth_base_url: server.uri(),
            client_key: "key".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "https://app.example.com/zoom/callback".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn get_meeting_parses_recurring_payload() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/meetings/85"))
            .and(header("authorization", "Bearer access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 85,
                "topic": "Morning flow",
                "type": 8,
                "start_time": "2030-01-01T10:00:00Z",
                "duration": 45,
                "occurrences": [
                    {
                        "occurrence_id": "1893492000000",
                        "start_time": "2030-01-01T10:00:00Z",
                        "duration": 45,
                        "status": "available"
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let meeting = client_for(&mock_server)
            .get_meeting("access", 85)
            .await
            .unwrap();

        assert_eq!(meeting.meeting_type, 8);
        assert_eq!(meeting.description(), "Morning flow");
        assert_eq!(meeting.occurrences.len(), 1);
        assert!(!meeting.occurrences[0].is_deleted());
    }

    #[tokio::test]
    async fn non_success_status_carries_status_and_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/meetings/404"))
            .respond_with(
                ResponseTemplate::new(404).set_body_string(r#"{"code":3001,"message":"not found"}"#),
            )
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .get_meeting("access", 404)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(err.to_string().contains("3001"));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/meetings/7"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .get_meeting("access", 7)
            .await
            .unwrap_err();

        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn update_meeting_targets_occurrence_and_expects_no_content() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/v2/meetings/42"))
            .and(query_param("occurrence_id", "abc"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        client_for(&mock_server)
            .update_meeting(
                "access",
                42,
                Some("abc"),
                &UpdateMeetingRequest {
                    topic: "Yoga".to_string(),
                    start_time: "2030-01-01T10:00:00Z".to_string(),
                    duration: 30,
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn delete_meeting_rejects_unexpected_success_code() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/v2/meetings/42"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .delete_meeting("access", 42, None)
            .await
            .unwrap_err();

        assert!(matches!(err, ZoomApiError::Status { status: 200, .. }));
    }

    #[tokio::test]
    async fn create_meeting_returns_ids_and_urls() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2/users/me/meetings"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 99,
                "join_url": "https://zoom.us/j/99",
                "start_url": "https://zoom.us/s/99",
                "password": "123456789"
            })))
            .mount(&mock_server)
            .await;

        let created = client_for(&mock_server)
            .create_meeting(
                "access",
                &CreateMeetingRequest {
                    topic: "Yoga".to_string(),
                    meeting_type: 2,
                    start_time: "2030-01-01T10:00:00Z".to_string(),
                    duration: 30,
                    password: "123456789".to_string(),
                    agenda: String::new(),
                    settings: MeetingSettings::default(),
                },
            )
            .await
            .unwrap();

        assert_eq!(created.id, 99);
        assert_eq!(created.join_url, "https://zoom.us/j/99");
    }

    #[tokio::test]
    async fn refresh_token_uses_basic_auth_and_rejects_empty_access_token() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .and(query_param("grant_type", "refresh_token"))
            .and(query_param("refresh_token", "r1"))
            .and(header("authorization", "Basic a2V5OnNlY3JldA=="))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "",
                "refresh_token": "r2"
            })))
            .mount(&mock_server)
            .await;

        let err = client_for(&mock_server)
            .refresh_token("r1")
            .await
            .unwrap_err();

        assert!(matches!(err, ZoomApiError::EmptyAccessToken));
    }

    #[test]
    fn install_url_carries_state_and_redirect() {
        let client = ZoomClient::new(ZoomClientConfig {
            api_base_url: "https://api.zoom.us/v2".to_string(),
            oauth_base_url: "https://zoom.us".to_string(),
            client_key: "key".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "https://app.example.com/zoom/callback".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();

        let url = client.install_url("17").unwrap();

        assert!(url.starts_with("https://zoom.us/oauth/authorize?client_id=key&response_type=code"));
        assert!(url.contains("state=17"));
        assert!(url.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fzoom%2Fcallback"));
    }
}
