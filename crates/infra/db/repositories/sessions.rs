use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{
    OptionalExtension, PgExpressionMethods, PgTextExpressionMethods, RunQueryDsl, delete,
    insert_into, prelude::*, update,
};
use std::sync::Arc;

use crate::{
    domain::{
        entities::sessions::{InsertSessionEntity, SessionEntity, UpdateSessionEntity},
        errors::RepositoryError,
        repositories::sessions::SessionRepository,
        value_objects::sessions::{NewSession, Session, SessionChanges},
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::sessions},
};

pub struct SessionPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl SessionPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

fn into_sessions(rows: Vec<SessionEntity>) -> Result<Vec<Session>> {
    rows.into_iter()
        .map(|row| Session::try_from(row).map_err(anyhow::Error::from))
        .collect()
}

#[async_trait]
impl SessionRepository for SessionPostgres {
    async fn find_by_id(&self, session_id: i64) -> Result<Option<Session>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = sessions::table
            .filter(sessions::id.eq(session_id))
            .select(SessionEntity::as_select())
            .first::<SessionEntity>(&mut conn)
            .optional()?;

        Ok(row.map(Session::try_from).transpose()?)
    }

    async fn find_by_owner_and_meeting(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
    ) -> Result<Option<Session>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = sessions::table
            .filter(sessions::user_id.eq(user_id))
            .filter(sessions::zoom_meeting_id.eq(zoom_meeting_id))
            .order(sessions::id.asc())
            .select(SessionEntity::as_select())
            .first::<SessionEntity>(&mut conn)
            .optional()?;

        Ok(row.map(Session::try_from).transpose()?)
    }

    async fn find_by_owner_meeting_and_occurrence(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
        occurrence_id: &str,
    ) -> Result<Option<Session>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = sessions::table
            .filter(sessions::user_id.eq(user_id))
            .filter(sessions::zoom_meeting_id.eq(zoom_meeting_id))
            .filter(sessions::zoom_occurrence_id.eq(occurrence_id))
            .select(SessionEntity::as_select())
            .first::<SessionEntity>(&mut conn)
            .optional()?;

        Ok(row.map(Session::try_from).transpose()?)
    }

    async fn find_by_owner_name_date_duration(
        &self,
        user_id: i64,
        start_time: i64,
        duration: i64,
        name: &str,
    ) -> Result<Option<Session>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = sessions::table
            .filter(sessions::user_id.eq(user_id))
            .filter(sessions::start_time.eq(start_time))
            .filter(sessions::duration.eq(duration))
            .filter(sessions::name.eq(name))
            .select(SessionEntity::as_select())
            .first::<SessionEntity>(&mut conn)
            .optional()?;

        Ok(row.map(Session::try_from).transpose()?)
    }

    async fn create(&self, new_session: NewSession) -> Result<Session> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(sessions::table)
            .values(&InsertSessionEntity::from(new_session))
            .returning(SessionEntity::as_returning())
            .get_result::<SessionEntity>(&mut conn)?;

        Ok(Session::try_from(row)?)
    }

    async fn update(&self, session_id: i64, changes: SessionChanges) -> Result<Session> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = update(sessions::table.filter(sessions::id.eq(session_id)))
            .set(&UpdateSessionEntity::from(changes))
            .returning(SessionEntity::as_returning())
            .get_result::<SessionEntity>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(Session::try_from(row)?)
    }

    async fn delete(&self, session_id: i64) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        delete(sessions::table.filter(sessions::id.eq(session_id))).execute(&mut conn)?;

        Ok(())
    }

    async fn delete_by_owner_and_meeting(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(
            sessions::table
                .filter(sessions::user_id.eq(user_id))
                .filter(sessions::zoom_meeting_id.eq(zoom_meeting_id)),
        )
        .execute(&mut conn)?;

        Ok(deleted)
    }

    async fn delete_by_owner_meeting_and_occurrence(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
        occurrence_id: &str,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(
            sessions::table
                .filter(sessions::user_id.eq(user_id))
                .filter(sessions::zoom_meeting_id.eq(zoom_meeting_id))
                .filter(sessions::zoom_occurrence_id.eq(occurrence_id)),
        )
        .execute(&mut conn)?;

        Ok(deleted)
    }

    async fn delete_by_owner_and_meeting_excluding_occurrences(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
        keep: Vec<String>,
    ) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted = delete(
            sessions::table
                .filter(sessions::user_id.eq(user_id))
                .filter(sessions::zoom_meeting_id.eq(zoom_meeting_id))
                .filter(
                    sessions::zoom_occurrence_id
                        .is_null()
                        .or(sessions::zoom_occurrence_id.ne_all(keep)),
                ),
        )
        .execute(&mut conn)?;

        Ok(deleted)
    }

    async fn disable_sync_for_owner(&self, user_id: i64) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let updated = update(sessions::table.filter(sessions::user_id.eq(user_id)))
            .set((
                sessions::zoom_sync_enabled.eq(Some(false)),
                sessions::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound.into());
        }

        Ok(updated)
    }

    async fn list_upcoming_by_owner(
        &self,
        user_id: i64,
        from: i64,
        limit: i64,
    ) -> Result<Vec<Session>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = sessions::table
            .filter(sessions::user_id.eq(user_id))
            .filter(sessions::start_time.ge(from))
            .order(sessions::start_time.asc())
            .limit(limit)
            .select(SessionEntity::as_select())
            .load::<SessionEntity>(&mut conn)?;

        into_sessions(rows)
    }

    async fn list_previous_by_owner(
        &self,
        user_id: i64,
        before: i64,
        limit: i64,
    ) -> Result<Vec<Session>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = sessions::table
            .filter(sessions::user_id.eq(user_id))
            .filter(sessions::start_time.lt(before))
            .order(sessions::start_time.desc())
            .limit(limit)
            .select(SessionEntity::as_select())
            .load::<SessionEntity>(&mut conn)?;

        into_sessions(rows)
    }

    async fn list_upcoming_by_ids(
        &self,
        session_ids: Vec<i64>,
        from: i64,
        limit: i64,
    ) -> Result<Vec<Session>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = sessions::table
            .filter(sessions::id.eq_any(session_ids))
            .filter(sessions::start_time.ge(from))
            .order(sessions::start_time.asc())
            .limit(limit)
            .select(SessionEntity::as_select())
            .load::<SessionEntity>(&mut conn)?;

        into_sessions(rows)
    }

    async fn list_previous_by_ids(
        &self,
        session_ids: Vec<i64>,
        before: i64,
        limit: i64,
    ) -> Result<Vec<Session>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = sessions::table
            .filter(sessions::id.eq_any(session_ids))
            .filter(sessions::start_time.lt(before))
            .order(sessions::start_time.desc())
            .limit(limit)
            .select(SessionEntity::as_select())
            .load::<SessionEntity>(&mut conn)?;

        into_sessions(rows)
    }

    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<Session>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = sessions::table
            .filter(sessions::user_id.eq(user_id))
            .order(sessions::start_time.desc())
            .select(SessionEntity::as_select())
            .load::<SessionEntity>(&mut conn)?;

        into_sessions(rows)
    }

    async fn list_published_from(
        &self,
        from: i64,
        limit: i64,
        tag: Option<String>,
    ) -> Result<Vec<Session>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let mut query = sessions::table
            .filter(sessions::start_time.ge(from))
            .filter(sessions::is_draft.is_distinct_from(true))
            .select(SessionEntity::as_select())
            .into_boxed();

        if let Some(tag) = tag {
            query = query.filter(sessions::tags.ilike(format!("%{tag}%")));
        }

        let rows = query
            .order(sessions::start_time.asc())
            .limit(limit)
            .load::<SessionEntity>(&mut conn)?;

        into_sessions(rows)
    }
}
