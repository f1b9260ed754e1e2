use std::sync::Arc;

use crates::{
    domain::{
        repositories::{
            sessions::SessionRepository, users::UserRepository, zoom_tokens::ZoomTokenRepository,
        },
        value_objects::zoom_tokens::NewZoomToken,
    },
    zoom::oauth_state,
};
use tracing::{error, info, warn};

use super::{
    errors::{UseCaseError, UseCaseResult},
    gateways::MeetingGateway,
    session_sync::SessionSyncUseCase,
    zoom_tokens::ZoomTokenUseCase,
};

/// Zoom app OAuth install: consent URL, code exchange, first full sync.
pub struct ZoomInstallUseCase<S, U, T, G>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    T: ZoomTokenRepository + Send + Sync + 'static,
    G: MeetingGateway + 'static,
{
    user_repo: Arc<U>,
    tokens: Arc<ZoomTokenUseCase<S, U, T, G>>,
    sync: Arc<SessionSyncUseCase<S, U, T, G>>,
    meeting_gateway: Arc<G>,
    state_secret: String,
}

impl<S, U, T, G> ZoomInstallUseCase<S, U, T, G>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    T: ZoomTokenRepository + Send + Sync + 'static,
    G: MeetingGateway + 'static,
{
    pub fn new(
        user_repo: Arc<U>,
        tokens: Arc<ZoomTokenUseCase<S, U, T, G>>,
        sync: Arc<SessionSyncUseCase<S, U, T, G>>,
        meeting_gateway: Arc<G>,
        state_secret: String,
    ) -> Self {
        Self {
            user_repo,
            tokens,
            sync,
            meeting_gateway,
            state_secret,
        }
    }

    pub fn install_url(&self, user_id: i64) -> UseCaseResult<String> {
        let state = oauth_state::sign_install_state(&self.state_secret, user_id)?;
        let url = self.meeting_gateway.install_url(&state)?;
        info!(user_id, "zoom_install: install url issued");
        Ok(url)
    }

    /// Stores the exchanged token, links the Zoom account and starts a
    /// background sync of the user's upcoming meetings. Returns the user id.
    pub async fn complete_install(&self, state: &str, code: &str) -> UseCaseResult<i64> {
        let user_id = oauth_state::verify_install_state(&self.state_secret, state).map_err(|err| {
            warn!(error = %err, "zoom_install: rejected install state");
            UseCaseError::Validation("invalid install state".to_string())
        })?;
        if code.is_empty() {
            return Err(UseCaseError::Validation("missing authorization code".to_string()));
        }

        let exchanged = self.meeting_gateway.exchange_code(code).await.map_err(|err| {
            error!(user_id, error = %err, "zoom_install: code exchange failed");
            UseCaseError::ExternalService(format!("zoom code exchange failed: {err}"))
        })?;

        let token = self
            .tokens
            .create_token(NewZoomToken {
                user_id,
                access_token: exchanged.access_token,
                token_type: exchanged.token_type,
                refresh_token: exchanged.refresh_token,
                expires_in: exchanged.expires_in,
                scope: exchanged.scope,
            })
            .await?;

        let zoom_user = self
            .meeting_gateway
            .current_user(&token.access_token)
            .await
            .map_err(|err| {
                error!(user_id, error = %err, "zoom_install: failed to load zoom user");
                UseCaseError::ExternalService(format!("zoom user lookup failed: {err}"))
            })?;

        self.user_repo
            .mark_zoom_installed(user_id, &zoom_user.account_id)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "zoom_install: failed to mark user installed");
                UseCaseError::Internal(err)
            })?;
        info!(user_id, zoom_account_id = %zoom_user.account_id, "zoom_install: app installed");

        let sync = Arc::clone(&self.sync);
        tokio::spawn(async move {
            match sync.sync_user_meetings(user_id).await {
                Ok(report) => info!(
                    user_id,
                    created = report.created,
                    errors = report.errors.len(),
                    "zoom_install: initial sync finished"
                ),
                Err(err) => error!(user_id, error = %err, "zoom_install: initial sync failed"),
            }
        });

        Ok(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::{
        gateways::{MockImageSearch, MockMeetingGateway, SeededPasswordSource},
        retry::RetryPolicy,
        sessions::SessionUseCase,
        test_support::{InMemorySessionRepository, InMemoryZoomTokenRepository},
    };
    use crates::{
        domain::repositories::users::MockUserRepository,
        zoom::payloads::{MeetingListPage, OAuthToken, ZoomUser},
    };
    use mockall::predicate::eq;
    use std::time::Duration;

    const SECRET: &str = "client-secret";

    fn build(
        users: MockUserRepository,
        gateway: MockMeetingGateway,
    ) -> (
        Arc<InMemoryZoomTokenRepository>,
        ZoomInstallUseCase<
            InMemorySessionRepository,
            MockUserRepository,
            InMemoryZoomTokenRepository,
            MockMeetingGateway,
        >,
    ) {
        let sessions = Arc::new(InMemorySessionRepository::default());
        let token_repo = Arc::new(InMemoryZoomTokenRepository::default());
        let users = Arc::new(users);
        let gateway = Arc::new(gateway);
        let retry = RetryPolicy::new(2, Duration::from_millis(1));
        let tokens = Arc::new(ZoomTokenUseCase::new(
            Arc::clone(&sessions),
            Arc::clone(&users),
            Arc::clone(&token_repo),
            Arc::clone(&gateway),
            retry,
        ));
        let session_usecase = Arc::new(SessionUseCase::new(
            Arc::clone(&sessions),
            Arc::clone(&users),
            Arc::clone(&tokens),
            Arc::clone(&gateway),
            Arc::new(MockImageSearch::new()),
            Arc::new(SeededPasswordSource::from_seed(1)),
        ));
        let sync = Arc::new(SessionSyncUseCase::new(
            sessions,
            session_usecase,
            Arc::clone(&tokens),
            Arc::clone(&gateway),
            retry,
        ));
        let install =
            ZoomInstallUseCase::new(users, tokens, sync, gateway, SECRET.to_string());
        (token_repo, install)
    }

    fn oauth(access: &str) -> OAuthToken {
        OAuthToken {
            access_token: access.to_string(),
            token_type: "bearer".to_string(),
            refresh_token: format!("{access}-refresh"),
            expires_in: 3599,
            scope: "meeting:write".to_string(),
        }
    }

    #[tokio::test]
    async fn install_url_carries_a_verifiable_state() {
        let mut gateway = MockMeetingGateway::new();
        gateway
            .expect_install_url()
            .returning(|state| Ok(format!("https://zoom.us/oauth/authorize?state={state}")));

        let (_, install) = build(MockUserRepository::new(), gateway);

        let url = install.install_url(42).unwrap();
        let state = url.rsplit_once("state=").unwrap().1;

        assert_eq!(oauth_state::verify_install_state(SECRET, state).unwrap(), 42);
    }

    #[tokio::test]
    async fn forged_state_is_rejected_before_any_exchange() {
        let mut gateway = MockMeetingGateway::new();
        gateway.expect_exchange_code().never();

        let (_, install) = build(MockUserRepository::new(), gateway);
        let forged = oauth_state::sign_install_state("other-secret", 42).unwrap();

        assert!(matches!(
            install.complete_install(&forged, "code").await,
            Err(UseCaseError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn completed_install_stores_token_and_links_account() {
        let mut gateway = MockMeetingGateway::new();
        gateway
            .expect_exchange_code()
            .with(eq("auth-code"))
            .times(1)
            .returning(|_| Ok(oauth("a1")));
        gateway.expect_current_user().returning(|_| {
            Ok(ZoomUser {
                id: "zu-1".to_string(),
                account_id: "acct-1".to_string(),
                email: "host@example.com".to_string(),
            })
        });
        gateway.expect_refresh_token().returning(|_| Ok(oauth("a2")));
        gateway.expect_list_upcoming_meetings().returning(|_, _| {
            Ok(MeetingListPage {
                page_count: 1,
                page_number: 1,
                page_size: 300,
                total_records: 0,
                meetings: vec![],
            })
        });

        let mut users = MockUserRepository::new();
        users
            .expect_mark_zoom_installed()
            .with(eq(42), eq("acct-1"))
            .times(1)
            .returning(|_, _| Ok(()));

        let (token_repo, install) = build(users, gateway);
        let state = oauth_state::sign_install_state(SECRET, 42).unwrap();

        let user_id = install.complete_install(&state, "auth-code").await.unwrap();

        assert_eq!(user_id, 42);
        let stored = token_repo.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].user_id, 42);
    }
}
