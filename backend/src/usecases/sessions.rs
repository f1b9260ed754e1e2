use std::sync::Arc;

use chrono::{DateTime, SecondsFormat};
use crates::{
    domain::{
        errors::RepositoryError,
        repositories::{
            sessions::SessionRepository, users::UserRepository, zoom_tokens::ZoomTokenRepository,
        },
        value_objects::{
            enums::{
                meeting_types::{MeetingType, ZOOM_SINGULAR_CODE},
                session_sources::SessionSource,
            },
            sessions::{
                MAX_SESSION_DURATION, MIN_SESSION_DURATION, NewSession, Session, SessionChanges,
            },
        },
    },
    zoom::payloads::{CreateMeetingRequest, MeetingSettings, UpdateMeetingRequest},
};
use tracing::{error, info, warn};

use super::{
    errors::{UseCaseError, UseCaseResult},
    gateways::{ImageSearch, MeetingGateway, MeetingPasswordSource},
    zoom_tokens::ZoomTokenUseCase,
};

pub const DEFAULT_SESSION_IMAGE: &str = "/Shared/via_banner_default.png";

pub struct SessionUseCase<S, U, T, G>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    T: ZoomTokenRepository + Send + Sync + 'static,
    G: MeetingGateway + 'static,
{
    session_repo: Arc<S>,
    user_repo: Arc<U>,
    tokens: Arc<ZoomTokenUseCase<S, U, T, G>>,
    meeting_gateway: Arc<G>,
    image_search: Arc<dyn ImageSearch>,
    passwords: Arc<dyn MeetingPasswordSource>,
}

fn rfc3339(start_time: i64) -> UseCaseResult<String> {
    DateTime::from_timestamp(start_time, 0)
        .map(|at| at.to_rfc3339_opts(SecondsFormat::Secs, true))
        .ok_or_else(|| UseCaseError::Validation(format!("start time {start_time} is out of range")))
}

fn validate_schedule(
    name: Option<&str>,
    start_time: Option<i64>,
    duration: Option<i64>,
) -> UseCaseResult<()> {
    if name.is_some_and(|name| name.trim().is_empty()) {
        return Err(UseCaseError::Validation("name is required".to_string()));
    }
    if start_time.is_some_and(|start| start < 0) {
        return Err(UseCaseError::Validation(
            "start time must not be negative".to_string(),
        ));
    }
    if duration.is_some_and(|d| !(MIN_SESSION_DURATION..=MAX_SESSION_DURATION).contains(&d)) {
        return Err(UseCaseError::Validation(format!(
            "duration must be between {MIN_SESSION_DURATION} and {MAX_SESSION_DURATION} minutes"
        )));
    }
    Ok(())
}

impl<S, U, T, G> SessionUseCase<S, U, T, G>
where
    S: SessionRepository + Send + Sync + 'static,
    U: UserRepository + Send + Sync + 'static,
    T: ZoomTokenRepository + Send + Sync + 'static,
    G: MeetingGateway + 'static,
{
    pub fn new(
        session_repo: Arc<S>,
        user_repo: Arc<U>,
        tokens: Arc<ZoomTokenUseCase<S, U, T, G>>,
        meeting_gateway: Arc<G>,
        image_search: Arc<dyn ImageSearch>,
        passwords: Arc<dyn MeetingPasswordSource>,
    ) -> Self {
        Self {
            session_repo,
            user_repo,
            tokens,
            meeting_gateway,
            image_search,
            passwords,
        }
    }

    pub async fn create_session(
        &self,
        mut new_session: NewSession,
        create_in_zoom: bool,
    ) -> UseCaseResult<Session> {
        let user_id = new_session.user_id;
        validate_schedule(
            Some(&new_session.name),
            Some(new_session.start_time),
            Some(new_session.duration),
        )?;

        self.user_repo
            .find_by_id(user_id)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "sessions: failed to load owner");
                UseCaseError::Internal(err)
            })?
            .ok_or_else(|| UseCaseError::NotFound(format!("user {user_id}")))?;

        self.ensure_unique(&new_session).await?;

        if new_session.source == SessionSource::ZoomWebhook
            && (new_session.profile_img_url.trim().is_empty()
                || new_session.banner_img_url.trim().is_empty())
        {
            self.backfill_images(&mut new_session).await;
        }

        let session = self
            .session_repo
            .create(new_session)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "sessions: failed to insert session");
                UseCaseError::Internal(err)
            })?;
        info!(
            user_id,
            session_id = session.id,
            zoom_meeting_id = ?session.zoom_meeting_id,
            zoom_occurrence_id = ?session.zoom_occurrence_id,
            "sessions: session created"
        );

        if !create_in_zoom {
            return Ok(session);
        }
        self.attach_zoom_meeting(session).await
    }

    async fn ensure_unique(&self, new_session: &NewSession) -> UseCaseResult<()> {
        let user_id = new_session.user_id;
        let lookup_failed = |err: anyhow::Error| {
            error!(user_id, db_error = ?err, "sessions: duplicate lookup failed");
            UseCaseError::Internal(err)
        };

        if let Some(existing) = self
            .session_repo
            .find_by_owner_name_date_duration(
                user_id,
                new_session.start_time,
                new_session.duration,
                &new_session.name,
            )
            .await
            .map_err(lookup_failed)?
        {
            return Err(UseCaseError::Validation(format!(
                "session {} already has this name, start time and duration",
                existing.id
            )));
        }

        let duplicate = match (
            new_session.zoom_meeting_id,
            new_session.zoom_occurrence_id.as_deref(),
        ) {
            (Some(meeting_id), Some(occurrence_id)) => self
                .session_repo
                .find_by_owner_meeting_and_occurrence(user_id, meeting_id, occurrence_id)
                .await
                .map_err(lookup_failed)?,
            (Some(meeting_id), None) => self
                .session_repo
                .find_by_owner_and_meeting(user_id, meeting_id)
                .await
                .map_err(lookup_failed)?,
            _ => None,
        };

        match duplicate {
            Some(existing) => Err(UseCaseError::Validation(format!(
                "session {} already tracks this zoom meeting",
                existing.id
            ))),
            None => Ok(()),
        }
    }

    /// Moves a mirrored session onto the schedule Zoom now reports, keeping
    /// the row. A rejected schedule leaves the stored session untouched.
    pub async fn reschedule_mirrored(
        &self,
        existing: &Session,
        candidate: NewSession,
    ) -> UseCaseResult<Session> {
        let user_id = existing.user_id;
        validate_schedule(
            Some(&candidate.name),
            Some(candidate.start_time),
            Some(candidate.duration),
        )?;

        let clash = self
            .session_repo
            .find_by_owner_name_date_duration(
                user_id,
                candidate.start_time,
                candidate.duration,
                &candidate.name,
            )
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "sessions: duplicate lookup failed");
                UseCaseError::Internal(err)
            })?;
        if let Some(clash) = clash.filter(|clash| clash.id != existing.id) {
            return Err(UseCaseError::Validation(format!(
                "session {} already has this name, start time and duration",
                clash.id
            )));
        }

        let changes = SessionChanges {
            name: Some(candidate.name),
            description: Some(candidate.description),
            start_time: Some(candidate.start_time),
            duration: Some(candidate.duration),
            meeting_url: Some(candidate.meeting_url),
            zoom_password: Some(candidate.zoom_password),
            zoom_meeting_join_url: Some(candidate.zoom_meeting_join_url),
            zoom_meeting_start_url: Some(candidate.zoom_meeting_start_url),
            ..Default::default()
        };
        let session = self
            .session_repo
            .update(existing.id, changes)
            .await
            .map_err(|err| {
                error!(user_id, session_id = existing.id, db_error = ?err, "sessions: failed to reschedule session");
                UseCaseError::Internal(err)
            })?;
        info!(
            user_id,
            session_id = session.id,
            zoom_meeting_id = ?session.zoom_meeting_id,
            "sessions: session rescheduled from zoom"
        );
        Ok(session)
    }

    async fn backfill_images(&self, new_session: &mut NewSession) {
        let image = match self.image_search.find_image_url(&new_session.name).await {
            Ok(url) => url,
            Err(err) => {
                warn!(
                    user_id = new_session.user_id,
                    error = %err,
                    "sessions: image search failed, using default image"
                );
                DEFAULT_SESSION_IMAGE.to_string()
            }
        };

        if new_session.profile_img_url.trim().is_empty() {
            new_session.profile_img_url = image.clone();
        }
        if new_session.banner_img_url.trim().is_empty() {
            new_session.banner_img_url = image;
        }
    }

    async fn attach_zoom_meeting(&self, session: Session) -> UseCaseResult<Session> {
        let user_id = session.user_id;
        let token = self.tokens.get_valid_token(user_id).await?;
        let password = self.passwords.next_password();

        let request = CreateMeetingRequest {
            topic: session.name.clone(),
            meeting_type: ZOOM_SINGULAR_CODE,
            start_time: rfc3339(session.start_time)?,
            duration: session.duration,
            password: password.clone(),
            agenda: session.description.clone(),
            settings: MeetingSettings::default(),
        };

        let created = self
            .meeting_gateway
            .create_meeting(&token.access_token, request)
            .await
            .map_err(|err| {
                error!(user_id, session_id = session.id, error = %err, "sessions: zoom create failed");
                UseCaseError::ExternalService(err.to_string())
            })?;

        let changes = SessionChanges {
            meeting_url: Some(Some(created.join_url.clone())),
            zoom_password: Some(Some(password)),
            zoom_meeting_id: Some(Some(created.id)),
            zoom_meeting_join_url: Some(Some(created.join_url)),
            zoom_meeting_start_url: Some(Some(created.start_url)),
            zoom_meeting_type: Some(MeetingType::Singular),
            zoom_sync_enabled: Some(Some(true)),
            ..Default::default()
        };

        let session = self
            .session_repo
            .update(session.id, changes)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "sessions: failed to link zoom meeting");
                UseCaseError::Internal(err)
            })?;
        info!(
            user_id,
            session_id = session.id,
            zoom_meeting_id = ?session.zoom_meeting_id,
            "sessions: zoom meeting linked"
        );
        Ok(session)
    }

    async fn owned_session(&self, user_id: i64, session_id: i64) -> UseCaseResult<Session> {
        let session = self
            .session_repo
            .find_by_id(session_id)
            .await
            .map_err(|err| {
                error!(session_id, db_error = ?err, "sessions: failed to load session");
                UseCaseError::Internal(err)
            })?;

        match session {
            Some(session) if session.user_id == user_id => Ok(session),
            _ => Err(UseCaseError::NotFound(format!("session {session_id}"))),
        }
    }

    /// The local row is the source of truth; Zoom propagation is best effort.
    pub async fn update_session(
        &self,
        user_id: i64,
        session_id: i64,
        changes: SessionChanges,
        propagate: bool,
    ) -> UseCaseResult<Session> {
        validate_schedule(changes.name.as_deref(), changes.start_time, changes.duration)?;
        self.owned_session(user_id, session_id).await?;

        let updated = self
            .session_repo
            .update(session_id, changes)
            .await
            .map_err(|err| {
                if RepositoryError::is_not_found(&err) {
                    UseCaseError::NotFound(format!("session {session_id}"))
                } else {
                    error!(session_id, db_error = ?err, "sessions: failed to update session");
                    UseCaseError::Internal(err)
                }
            })?;
        info!(user_id, session_id, "sessions: session updated");

        if propagate && updated.is_sync_enabled() {
            if let Some(meeting_id) = updated.zoom_meeting_id {
                if let Err(err) = self.push_update(&updated, meeting_id).await {
                    warn!(
                        user_id,
                        session_id,
                        zoom_meeting_id = meeting_id,
                        error = %err,
                        "sessions: zoom update not propagated"
                    );
                }
            }
        }

        Ok(updated)
    }

    async fn push_update(&self, session: &Session, meeting_id: i64) -> UseCaseResult<()> {
        let token = self.tokens.get_valid_token(session.user_id).await?;
        let request = UpdateMeetingRequest {
            topic: session.name.clone(),
            start_time: rfc3339(session.start_time)?,
            duration: session.duration,
        };
        self.meeting_gateway
            .update_meeting(
                &token.access_token,
                meeting_id,
                session.zoom_occurrence_id.clone(),
                request,
            )
            .await
            .map_err(|err| UseCaseError::ExternalService(err.to_string()))
    }

    /// Deletes locally first; the Zoom delete is best effort.
    pub async fn delete_session(&self, user_id: i64, session_id: i64) -> UseCaseResult<()> {
        let session = self.owned_session(user_id, session_id).await?;

        self.session_repo
            .delete(session_id)
            .await
            .map_err(|err| {
                error!(session_id, db_error = ?err, "sessions: failed to delete session");
                UseCaseError::Internal(err)
            })?;
        info!(user_id, session_id, "sessions: session deleted");

        if !session.is_sync_enabled() {
            return Ok(());
        }
        let Some(meeting_id) = session.zoom_meeting_id else {
            return Ok(());
        };

        let pushed = async {
            let token = self.tokens.get_valid_token(user_id).await?;
            self.meeting_gateway
                .delete_meeting(
                    &token.access_token,
                    meeting_id,
                    session.zoom_occurrence_id.clone(),
                )
                .await
                .map_err(|err| UseCaseError::ExternalService(err.to_string()))
        };
        if let Err(err) = pushed.await {
            warn!(
                user_id,
                session_id,
                zoom_meeting_id = meeting_id,
                error = %err,
                "sessions: zoom delete not propagated"
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::{
        gateways::{MockImageSearch, MockMeetingGateway, SeededPasswordSource},
        retry::RetryPolicy,
        test_support::{InMemorySessionRepository, InMemoryZoomTokenRepository, manual_session, user},
    };
    use crates::{
        domain::{
            repositories::users::MockUserRepository, value_objects::zoom_tokens::NewZoomToken,
        },
        zoom::{
            payloads::{CreatedMeeting, OAuthToken},
            zoom_client::ZoomApiError,
        },
    };
    use std::time::Duration;

    type TestUseCase = SessionUseCase<
        InMemorySessionRepository,
        MockUserRepository,
        InMemoryZoomTokenRepository,
        MockMeetingGateway,
    >;

    struct Harness {
        sessions: Arc<InMemorySessionRepository>,
        usecase: TestUseCase,
    }

    fn users_with(id: i64) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(move |requested| {
            Ok((requested == id).then(|| user(id)))
        });
        users
    }

    async fn harness(gateway: MockMeetingGateway, images: MockImageSearch) -> Harness {
        let sessions = Arc::new(InMemorySessionRepository::default());
        let tokens = Arc::new(InMemoryZoomTokenRepository::default());
        tokens
            .insert(NewZoomToken {
                user_id: 1,
                access_token: "a1".to_string(),
                token_type: "bearer".to_string(),
                refresh_token: "r1".to_string(),
                expires_in: 3599,
                scope: String::new(),
            })
            .await
            .unwrap();

        let users = Arc::new(users_with(1));
        let gateway = Arc::new(gateway);
        let token_usecase = Arc::new(ZoomTokenUseCase::new(
            Arc::clone(&sessions),
            Arc::clone(&users),
            tokens,
            Arc::clone(&gateway),
            RetryPolicy::new(2, Duration::from_millis(1)),
        ));
        let usecase = SessionUseCase::new(
            Arc::clone(&sessions),
            users,
            token_usecase,
            gateway,
            Arc::new(images),
            Arc::new(SeededPasswordSource::from_seed(1)),
        );
        Harness { sessions, usecase }
    }

    fn refreshing_gateway() -> MockMeetingGateway {
        let mut gateway = MockMeetingGateway::new();
        gateway.expect_refresh_token().returning(|_| {
            Ok(OAuthToken {
                access_token: "a2".to_string(),
                token_type: "bearer".to_string(),
                refresh_token: "r2".to_string(),
                expires_in: 3599,
                scope: String::new(),
            })
        });
        gateway
    }

    #[tokio::test]
    async fn rejects_invalid_input_before_touching_storage() {
        let h = harness(MockMeetingGateway::new(), MockImageSearch::new()).await;

        for bad in [
            manual_session(1, "  ", 100, 30),
            manual_session(1, "Yoga", -1, 30),
            manual_session(1, "Yoga", 100, 0),
            manual_session(1, "Yoga", 100, 10_001),
        ] {
            assert!(matches!(
                h.usecase.create_session(bad, false).await,
                Err(UseCaseError::Validation(_))
            ));
        }
        assert!(h.sessions.all().is_empty());
    }

    #[tokio::test]
    async fn unknown_owner_is_not_found() {
        let h = harness(MockMeetingGateway::new(), MockImageSearch::new()).await;

        let result = h
            .usecase
            .create_session(manual_session(2, "Yoga", 100, 30), false)
            .await;

        assert!(matches!(result, Err(UseCaseError::NotFound(_))));
    }

    #[tokio::test]
    async fn duplicate_name_date_duration_is_rejected() {
        let h = harness(MockMeetingGateway::new(), MockImageSearch::new()).await;
        h.usecase
            .create_session(manual_session(1, "Yoga", 100, 30), false)
            .await
            .unwrap();

        let second = h
            .usecase
            .create_session(manual_session(1, "Yoga", 100, 30), false)
            .await;

        assert!(matches!(second, Err(UseCaseError::Validation(_))));
        assert_eq!(h.sessions.all().len(), 1);
    }

    #[tokio::test]
    async fn webhook_sessions_fall_back_to_default_image() {
        let mut images = MockImageSearch::new();
        images
            .expect_find_image_url()
            .returning(|_| Err(anyhow::anyhow!("rate limited")));
        let h = harness(MockMeetingGateway::new(), images).await;

        let mut new_session = manual_session(1, "Yoga", 100, 30);
        new_session.source = SessionSource::ZoomWebhook;
        new_session.banner_img_url = String::new();

        let session = h.usecase.create_session(new_session, false).await.unwrap();

        assert_eq!(session.banner_img_url, DEFAULT_SESSION_IMAGE);
        assert_eq!(session.profile_img_url, "/img/p.png");
    }

    #[tokio::test]
    async fn create_in_zoom_links_the_meeting() {
        let mut gateway = refreshing_gateway();
        gateway
            .expect_create_meeting()
            .withf(|token, request| {
                token == "a2"
                    && request.meeting_type == 2
                    && request.password.len() == 9
                    && request.start_time == "1970-01-01T00:01:40Z"
            })
            .times(1)
            .returning(|_, request| {
                Ok(CreatedMeeting {
                    id: 77,
                    join_url: "https://zoom.us/j/77".to_string(),
                    start_url: "https://zoom.us/s/77".to_string(),
                    password: request.password,
                })
            });
        let h = harness(gateway, MockImageSearch::new()).await;

        let session = h
            .usecase
            .create_session(manual_session(1, "Yoga", 100, 30), true)
            .await
            .unwrap();

        assert_eq!(session.zoom_meeting_id, Some(77));
        assert_eq!(session.meeting_url.as_deref(), Some("https://zoom.us/j/77"));
        assert_eq!(session.zoom_meeting_type, MeetingType::Singular);
        assert!(session.is_sync_enabled());
        assert_eq!(session.zoom_password.as_ref().map(String::len), Some(9));
    }

    #[tokio::test]
    async fn failed_zoom_propagation_does_not_fail_the_update() {
        let mut gateway = refreshing_gateway();
        gateway.expect_update_meeting().times(1).returning(|_, _, _, _| {
            Err(ZoomApiError::Status {
                context: "update meeting",
                status: 500,
                body: "down".to_string(),
            })
        });
        let h = harness(gateway, MockImageSearch::new()).await;

        let mut new_session = manual_session(1, "Yoga", 100, 30);
        new_session.zoom_meeting_id = Some(77);
        new_session.zoom_sync_enabled = Some(true);
        let stored = h.sessions.seed(new_session);

        let updated = h
            .usecase
            .update_session(
                1,
                stored.id,
                SessionChanges {
                    duration: Some(45),
                    ..Default::default()
                },
                true,
            )
            .await
            .unwrap();

        assert_eq!(updated.duration, 45);
    }

    #[tokio::test]
    async fn other_users_sessions_are_not_found() {
        let h = harness(MockMeetingGateway::new(), MockImageSearch::new()).await;
        let stored = h.sessions.seed(manual_session(3, "Yoga", 100, 30));

        assert!(matches!(
            h.usecase.delete_session(1, stored.id).await,
            Err(UseCaseError::NotFound(_))
        ));
        assert_eq!(h.sessions.all().len(), 1);
    }

    #[tokio::test]
    async fn delete_succeeds_even_when_zoom_delete_fails() {
        let mut gateway = refreshing_gateway();
        gateway
            .expect_delete_meeting()
            .withf(|_, meeting_id, occurrence| *meeting_id == 77 && occurrence.is_none())
            .times(1)
            .returning(|_, _, _| {
                Err(ZoomApiError::Status {
                    context: "delete meeting",
                    status: 404,
                    body: String::new(),
                })
            });
        let h = harness(gateway, MockImageSearch::new()).await;

        let mut new_session = manual_session(1, "Yoga", 100, 30);
        new_session.zoom_meeting_id = Some(77);
        new_session.zoom_sync_enabled = Some(true);
        let stored = h.sessions.seed(new_session);

        h.usecase.delete_session(1, stored.id).await.unwrap();

        assert!(h.sessions.all().is_empty());
    }
}
