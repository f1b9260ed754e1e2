use std::sync::Arc;

use chrono::Utc;
use crates::{
    domain::{
        errors::RepositoryError,
        repositories::{
            sessions::SessionRepository, users::UserRepository, zoom_tokens::ZoomTokenRepository,
        },
        value_objects::zoom_tokens::{NewZoomToken, ZoomToken},
    },
    zoom::{payloads::OAuthToken, zoom_client::ZoomApiError},
};
use tracing::{error, info, warn};

use super::{
    errors::{UseCaseError, UseCaseResult},
    gateways::MeetingGateway,
    retry::{RetryPolicy, retry_async},
};

/// Owns the per-user Zoom OAuth token: refresh on read, replace on create,
/// best-effort revoke.
pub struct ZoomTokenUseCase<S, U, T, G>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    T: ZoomTokenRepository + Send + Sync + 'static,
    G: MeetingGateway + 'static,
{
    session_repo: Arc<S>,
    user_repo: Arc<U>,
    token_repo: Arc<T>,
    meeting_gateway: Arc<G>,
    refresh_retry: RetryPolicy,
}

impl<S, U, T, G> ZoomTokenUseCase<S, U, T, G>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    T: ZoomTokenRepository + Send + Sync + 'static,
    G: MeetingGateway + 'static,
{
    pub fn new(
        session_repo: Arc<S>,
        user_repo: Arc<U>,
        token_repo: Arc<T>,
        meeting_gateway: Arc<G>,
        refresh_retry: RetryPolicy,
    ) -> Self {
        Self {
            session_repo,
            user_repo,
            token_repo,
            meeting_gateway,
            refresh_retry,
        }
    }

    /// Loads the stored token and always refreshes it; the cached expiry is
    /// never trusted. The stored row is only touched after a successful refresh.
    pub async fn get_valid_token(&self, user_id: i64) -> UseCaseResult<ZoomToken> {
        let existing = self
            .token_repo
            .find_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "zoom_tokens: failed to load token");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| UseCaseError::NotFound(format!("zoom token for user {user_id}")))?;

        if existing.refresh_token.is_empty() {
            warn!(user_id, "zoom_tokens: stored token has no refresh token");
            return Err(UseCaseError::ExternalService(
                "stored zoom token has no refresh token".to_string(),
            ));
        }

        let gateway = &self.meeting_gateway;
        let refresh_token = existing.refresh_token.as_str();
        let refreshed = retry_async(
            self.refresh_retry,
            "zoom_tokens: refresh",
            |_: &ZoomApiError| true,
            move || gateway.refresh_token(refresh_token),
        )
        .await
        .map_err(|err| {
            error!(user_id, error = %err, "zoom_tokens: refresh failed");
            UseCaseError::ExternalService(err.to_string())
        })?;

        if refreshed.access_token.is_empty() {
            return Err(UseCaseError::ExternalService(
                ZoomApiError::EmptyAccessToken.to_string(),
            ));
        }

        let rotated = Self::rotate(existing, refreshed);
        let stored = self.token_repo.update(rotated).await.map_err(|err| {
            error!(user_id, db_error = ?err, "zoom_tokens: failed to persist refreshed token");
            UseCaseError::Internal(err)
        })?;

        info!(user_id, token_id = stored.id, "zoom_tokens: token refreshed");
        Ok(stored)
    }

    fn rotate(existing: ZoomToken, refreshed: OAuthToken) -> ZoomToken {
        ZoomToken {
            id: existing.id,
            created_at: existing.created_at,
            updated_at: Utc::now(),
            user_id: existing.user_id,
            access_token: refreshed.access_token,
            token_type: refreshed.token_type,
            refresh_token: if refreshed.refresh_token.is_empty() {
                existing.refresh_token
            } else {
                refreshed.refresh_token
            },
            expires_in: refreshed.expires_in,
            scope: refreshed.scope,
        }
    }

    /// Replace-on-write: any previous token of the user is deleted first.
    pub async fn create_token(&self, new_token: NewZoomToken) -> UseCaseResult<ZoomToken> {
        let user_id = new_token.user_id;

        let removed = self
            .token_repo
            .delete_by_user_id(user_id)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "zoom_tokens: failed to clear previous tokens");
                UseCaseError::Internal(err)
            })?;

        let token = self.token_repo.insert(new_token).await.map_err(|err| {
            error!(user_id, db_error = ?err, "zoom_tokens: failed to insert token");
            UseCaseError::Internal(err)
        })?;

        info!(user_id, removed, token_id = token.id, "zoom_tokens: token stored");
        Ok(token)
    }

    /// Runs every step even when an earlier one fails.
    pub async fn revoke(&self, user_id: i64) {
        info!(user_id, "zoom_tokens: revoking zoom access");

        match self.token_repo.delete_by_user_id(user_id).await {
            Ok(removed) => info!(user_id, removed, "zoom_tokens: tokens deleted"),
            Err(err) => error!(user_id, db_error = ?err, "zoom_tokens: failed to delete tokens"),
        }

        match self.session_repo.disable_sync_for_owner(user_id).await {
            Ok(updated) => info!(user_id, updated, "zoom_tokens: session sync disabled"),
            Err(err) if RepositoryError::is_not_found(&err) => {
                info!(user_id, "zoom_tokens: no sessions to disable")
            }
            Err(err) => {
                error!(user_id, db_error = ?err, "zoom_tokens: failed to disable session sync")
            }
        }

        match self.user_repo.clear_zoom_installation(user_id).await {
            Ok(()) => info!(user_id, "zoom_tokens: install flag cleared"),
            Err(err) => {
                error!(user_id, db_error = ?err, "zoom_tokens: failed to clear install flag")
            }
        }
    }
}
