use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::sessions::{NewSession, Session, SessionChanges};

#[automock]
#[async_trait]
pub trait SessionRepository {
    async fn find_by_id(&self, session_id: i64) -> Result<Option<Session>>;

    async fn find_by_owner_and_meeting(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
    ) -> Result<Option<Session>>;

    async fn find_by_owner_meeting_and_occurrence(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
        occurrence_id: &str,
    ) -> Result<Option<Session>>;

    async fn find_by_owner_name_date_duration(
        &self,
        user_id: i64,
        start_time: i64,
        duration: i64,
        name: &str,
    ) -> Result<Option<Session>>;

    async fn create(&self, new_session: NewSession) -> Result<Session>;

    /// Fails with `RepositoryError::NotFound` when the row is gone.
    async fn update(&self, session_id: i64, changes: SessionChanges) -> Result<Session>;

    async fn delete(&self, session_id: i64) -> Result<()>;

    async fn delete_by_owner_and_meeting(&self, user_id: i64, zoom_meeting_id: i64)
    -> Result<usize>;

    async fn delete_by_owner_meeting_and_occurrence(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
        occurrence_id: &str,
    ) -> Result<usize>;

    /// Removes every row of the meeting whose occurrence id is not in `keep`.
    async fn delete_by_owner_and_meeting_excluding_occurrences(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
        keep: Vec<String>,
    ) -> Result<usize>;

    /// Fails with `RepositoryError::NotFound` when the user has no sessions.
    async fn disable_sync_for_owner(&self, user_id: i64) -> Result<usize>;

    async fn list_upcoming_by_owner(&self, user_id: i64, from: i64, limit: i64)
    -> Result<Vec<Session>>;

    async fn list_previous_by_owner(
        &self,
        user_id: i64,
        before: i64,
        limit: i64,
    ) -> Result<Vec<Session>>;

    async fn list_upcoming_by_ids(
        &self,
        session_ids: Vec<i64>,
        from: i64,
        limit: i64,
    ) -> Result<Vec<Session>>;

    async fn list_previous_by_ids(
        &self,
        session_ids: Vec<i64>,
        before: i64,
        limit: i64,
    ) -> Result<Vec<Session>>;

    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<Session>>;

    async fn list_published_from(
        &self,
        from: i64,
        limit: i64,
        tag: Option<String>,
    ) -> Result<Vec<Session>>;
}
