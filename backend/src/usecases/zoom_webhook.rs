use std::sync::Arc;

use crates::{
    domain::{
        repositories::{
            sessions::SessionRepository, users::UserRepository, zoom_tokens::ZoomTokenRepository,
        },
        value_objects::{enums::meeting_types::MeetingType, users::User},
    },
    zoom::webhook::{
        self, EVENT_APP_DEAUTHORIZED, EVENT_MEETING_CREATED, EVENT_MEETING_DELETED,
        EVENT_MEETING_UPDATED, EVENT_URL_VALIDATION, UrlValidationResponse, WebhookEvent,
        WebhookObject,
    },
};
use tracing::{error, info, warn};

use super::{
    errors::{UseCaseError, UseCaseResult},
    gateways::MeetingGateway,
    session_sync::SessionSyncUseCase,
    zoom_tokens::ZoomTokenUseCase,
};

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookOutcome {
    Acknowledged,
    UrlValidation(UrlValidationResponse),
}

/// Headers Zoom signs a delivery with.
#[derive(Debug, Clone, Default)]
pub struct WebhookSignature {
    pub timestamp: Option<String>,
    pub signature: Option<String>,
}

pub struct ZoomWebhookUseCase<S, U, T, G>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    T: ZoomTokenRepository + Send + Sync + 'static,
    G: MeetingGateway + 'static,
{
    user_repo: Arc<U>,
    sync: Arc<SessionSyncUseCase<S, U, T, G>>,
    tokens: Arc<ZoomTokenUseCase<S, U, T, G>>,
    secret_token: Option<String>,
}

impl<S, U, T, G> ZoomWebhookUseCase<S, U, T, G>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    T: ZoomTokenRepository + Send + Sync + 'static,
    G: MeetingGateway + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        sync: Arc<SessionSyncUseCase<S, U, T, G>>,
        tokens: Arc<ZoomTokenUseCase<S, U, T, G>>,
        secret_token: Option<String>,
    ) -> Self {
        Self {
            user_repo,
            sync,
            tokens,
            secret_token,
        }
    }

    fn verify(&self, body: &[u8], headers: &WebhookSignature) -> UseCaseResult<()> {
        let Some(secret) = self.secret_token.as_deref() else {
            return Ok(());
        };
        let (Some(timestamp), Some(signature)) =
            (headers.timestamp.as_deref(), headers.signature.as_deref())
        else {
            warn!("zoom_webhook: unsigned delivery rejected");
            return Err(UseCaseError::Validation(
                "missing zoom signature headers".to_string(),
            ));
        };

        webhook::verify_signature(secret, timestamp, body, signature).map_err(|err| {
            warn!(error = %err, "zoom_webhook: signature verification failed");
            UseCaseError::Validation("signature verification failed".to_string())
        })
    }

    pub async fn handle(
        &self,
        body: &[u8],
        headers: WebhookSignature,
    ) -> UseCaseResult<WebhookOutcome> {
        self.verify(body, &headers)?;

        let event: WebhookEvent = serde_json::from_slice(body).map_err(|err| {
            warn!(error = %err, "zoom_webhook: malformed payload");
            UseCaseError::Validation(format!("malformed webhook payload: {err}"))
        })?;
        info!(event = %event.event, account_id = %event.payload.account_id, "zoom_webhook: event received");

        match event.event.as_str() {
            EVENT_URL_VALIDATION => self.validate_url(&event).map(WebhookOutcome::UrlValidation),
            EVENT_MEETING_CREATED | EVENT_MEETING_UPDATED => {
                let (user, object) = self.resolve(&event).await?;
                let report = self.sync.sync_meeting_ids(user.id, vec![object.id]).await?;
                if !report.errors.is_empty() {
                    warn!(
                        user_id = user.id,
                        zoom_meeting_id = object.id,
                        errors = ?report.errors,
                        "zoom_webhook: meeting synced with errors"
                    );
                }
                Ok(WebhookOutcome::Acknowledged)
            }
            EVENT_MEETING_DELETED => {
                let (user, object) = self.resolve(&event).await?;
                let occurrence_ids = object
                    .occurrences
                    .iter()
                    .map(|occurrence| occurrence.occurrence_id.clone())
                    .collect();
                self.sync
                    .remove_meeting(
                        user.id,
                        object.id,
                        MeetingType::from_zoom_code(object.meeting_type),
                        occurrence_ids,
                    )
                    .await?;
                Ok(WebhookOutcome::Acknowledged)
            }
            EVENT_APP_DEAUTHORIZED => {
                let user = self.user_for_account(&event.payload.account_id).await?;
                self.tokens.revoke(user.id).await;
                Ok(WebhookOutcome::Acknowledged)
            }
            other => {
                info!(event = other, "zoom_webhook: event ignored");
                Ok(WebhookOutcome::Acknowledged)
            }
        }
    }

    fn validate_url(&self, event: &WebhookEvent) -> UseCaseResult<UrlValidationResponse> {
        let secret = self.secret_token.as_deref().ok_or_else(|| {
            UseCaseError::Validation("url validation needs a webhook secret token".to_string())
        })?;
        let plain_token = event
            .payload
            .plain_token
            .as_deref()
            .ok_or_else(|| UseCaseError::Validation("missing plainToken".to_string()))?;
        webhook::url_validation_response(secret, plain_token).map_err(UseCaseError::Internal)
    }

    async fn user_for_account(&self, account_id: &str) -> UseCaseResult<User> {
        if account_id.is_empty() {
            return Err(UseCaseError::Validation("missing account_id".to_string()));
        }
        self.user_repo
            .find_by_zoom_account_id(account_id)
            .await
            .map_err(|err| {
                error!(account_id, db_error = ?err, "zoom_webhook: failed to load user");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| UseCaseError::NotFound(format!("user for zoom account {account_id}")))
    }

    async fn resolve<'a>(&self, event: &'a WebhookEvent) -> UseCaseResult<(User, &'a WebhookObject)> {
        let object = event
            .payload
            .object
            .as_ref()
            .ok_or_else(|| UseCaseError::Validation("missing meeting object".to_string()))?;
        let user = self.user_for_account(&event.payload.account_id).await?;
        Ok((user, object))
    }
}
