use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use crates::domain::{
    errors::RepositoryError,
    repositories::{sessions::SessionRepository, zoom_tokens::ZoomTokenRepository},
    value_objects::{
        enums::{meeting_types::MeetingType, session_sources::SessionSource},
        sessions::{NewSession, Session, SessionChanges},
        users::User,
        zoom_tokens::{NewZoomToken, ZoomToken},
    },
};

struct Rows<T> {
    next_id: i64,
    items: Vec<T>,
}

impl<T> Default for Rows<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            items: Vec::new(),
        }
    }
}

impl<T> Rows<T> {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Session table kept in memory so reconciliation can be observed end to end.
#[derive(Default)]
pub struct InMemorySessionRepository {
    rows: Mutex<Rows<Session>>,
}

impl InMemorySessionRepository {
    pub fn all(&self) -> Vec<Session> {
        self.rows.lock().unwrap().items.clone()
    }

    pub fn seed(&self, new_session: NewSession) -> Session {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.next_id();
        let session = materialize(id, new_session);
        rows.items.push(session.clone());
        session
    }

    fn find(&self, predicate: impl Fn(&Session) -> bool) -> Option<Session> {
        self.rows
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|s| predicate(s))
            .cloned()
    }

    fn remove(&self, predicate: impl Fn(&Session) -> bool) -> usize {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.items.len();
        rows.items.retain(|s| !predicate(s));
        before - rows.items.len()
    }

    fn select(&self, predicate: impl Fn(&Session) -> bool) -> Vec<Session> {
        self.rows
            .lock()
            .unwrap()
            .items
            .iter()
            .filter(|s| predicate(s))
            .cloned()
            .collect()
    }
}

fn materialize(id: i64, new_session: NewSession) -> Session {
    let now = Utc::now();
    Session {
        id,
        created_at: now,
        updated_at: now,
        user_id: new_session.user_id,
        name: new_session.name,
        description: new_session.description,
        start_time: new_session.start_time,
        duration: new_session.duration,
        max_session_size: new_session.max_session_size,
        cost: new_session.cost,
        meeting_url: new_session.meeting_url,
        profile_img_url: new_session.profile_img_url,
        banner_img_url: new_session.banner_img_url,
        tags: new_session.tags,
        zoom_password: new_session.zoom_password,
        is_draft: new_session.is_draft,
        zoom_meeting_id: new_session.zoom_meeting_id,
        zoom_meeting_join_url: new_session.zoom_meeting_join_url,
        zoom_meeting_start_url: new_session.zoom_meeting_start_url,
        zoom_occurrence_id: new_session.zoom_occurrence_id,
        zoom_meeting_type: new_session.zoom_meeting_type,
        zoom_sync_enabled: new_session.zoom_sync_enabled,
        source: new_session.source,
    }
}

fn apply(session: &mut Session, changes: SessionChanges) {
    if let Some(v) = changes.name {
        session.name = v;
    }
    if let Some(v) = changes.description {
        session.description = v;
    }
    if let Some(v) = changes.start_time {
        session.start_time = v;
    }
    if let Some(v) = changes.duration {
        session.duration = v;
    }
    if let Some(v) = changes.max_session_size {
        session.max_session_size = v;
    }
    if let Some(v) = changes.cost {
        session.cost = v;
    }
    if let Some(v) = changes.meeting_url {
        session.meeting_url = v;
    }
    if let Some(v) = changes.profile_img_url {
        session.profile_img_url = v;
    }
    if let Some(v) = changes.banner_img_url {
        session.banner_img_url = v;
    }
    if let Some(v) = changes.tags {
        session.tags = v;
    }
    if let Some(v) = changes.zoom_password {
        session.zoom_password = v;
    }
    if let Some(v) = changes.is_draft {
        session.is_draft = v;
    }
    if let Some(v) = changes.zoom_meeting_id {
        session.zoom_meeting_id = v;
    }
    if let Some(v) = changes.zoom_meeting_join_url {
        session.zoom_meeting_join_url = v;
    }
    if let Some(v) = changes.zoom_meeting_start_url {
        session.zoom_meeting_start_url = v;
    }
    if let Some(v) = changes.zoom_meeting_type {
        session.zoom_meeting_type = v;
    }
    if let Some(v) = changes.zoom_sync_enabled {
        session.zoom_sync_enabled = v;
    }
    session.updated_at = Utc::now();
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn find_by_id(&self, session_id: i64) -> Result<Option<Session>> {
        Ok(self.find(|s| s.id == session_id))
    }

    async fn find_by_owner_and_meeting(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
    ) -> Result<Option<Session>> {
        Ok(self.find(|s| s.user_id == user_id && s.zoom_meeting_id == Some(zoom_meeting_id)))
    }

    async fn find_by_owner_meeting_and_occurrence(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
        occurrence_id: &str,
    ) -> Result<Option<Session>> {
        Ok(self.find(|s| {
            s.user_id == user_id
                && s.zoom_meeting_id == Some(zoom_meeting_id)
                && s.zoom_occurrence_id.as_deref() == Some(occurrence_id)
        }))
    }

    async fn find_by_owner_name_date_duration(
        &self,
        user_id: i64,
        start_time: i64,
        duration: i64,
        name: &str,
    ) -> Result<Option<Session>> {
        Ok(self.find(|s| {
            s.user_id == user_id
                && s.start_time == start_time
                && s.duration == duration
                && s.name == name
        }))
    }

    async fn create(&self, new_session: NewSession) -> Result<Session> {
        Ok(self.seed(new_session))
    }

    async fn update(&self, session_id: i64, changes: SessionChanges) -> Result<Session> {
        let mut rows = self.rows.lock().unwrap();
        let session = rows
            .items
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or(RepositoryError::NotFound)?;
        apply(session, changes);
        Ok(session.clone())
    }

    async fn delete(&self, session_id: i64) -> Result<()> {
        self.remove(|s| s.id == session_id);
        Ok(())
    }

    async fn delete_by_owner_and_meeting(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
    ) -> Result<usize> {
        Ok(self.remove(|s| s.user_id == user_id && s.zoom_meeting_id == Some(zoom_meeting_id)))
    }

    async fn delete_by_owner_meeting_and_occurrence(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
        occurrence_id: &str,
    ) -> Result<usize> {
        Ok(self.remove(|s| {
            s.user_id == user_id
                && s.zoom_meeting_id == Some(zoom_meeting_id)
                && s.zoom_occurrence_id.as_deref() == Some(occurrence_id)
        }))
    }

    async fn delete_by_owner_and_meeting_excluding_occurrences(
        &self,
        user_id: i64,
        zoom_meeting_id: i64,
        keep: Vec<String>,
    ) -> Result<usize> {
        Ok(self.remove(|s| {
            s.user_id == user_id
                && s.zoom_meeting_id == Some(zoom_meeting_id)
                && s
                    .zoom_occurrence_id
                    .as_ref()
                    .is_none_or(|occurrence| !keep.contains(occurrence))
        }))
    }

    async fn disable_sync_for_owner(&self, user_id: i64) -> Result<usize> {
        let mut rows = self.rows.lock().unwrap();
        let mut updated = 0;
        for session in rows.items.iter_mut().filter(|s| s.user_id == user_id) {
            session.zoom_sync_enabled = Some(false);
            updated += 1;
        }
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
        let mut sessions = self.select(|s| s.user_id == user_id && s.start_time >= from);
        sessions.sort_by_key(|s| s.start_time);
        sessions.truncate(limit as usize);
        Ok(sessions)
    }

    async fn list_previous_by_owner(
        &self,
        user_id: i64,
        before: i64,
        limit: i64,
    ) -> Result<Vec<Session>> {
        let mut sessions = self.select(|s| s.user_id == user_id && s.start_time < before);
        sessions.sort_by_key(|s| std::cmp::Reverse(s.start_time));
        sessions.truncate(limit as usize);
        Ok(sessions)
    }

    async fn list_upcoming_by_ids(
        &self,
        session_ids: Vec<i64>,
        from: i64,
        limit: i64,
    ) -> Result<Vec<Session>> {
        let mut sessions = self.select(|s| session_ids.contains(&s.id) && s.start_time >= from);
        sessions.sort_by_key(|s| s.start_time);
        sessions.truncate(limit as usize);
        Ok(sessions)
    }

    async fn list_previous_by_ids(
        &self,
        session_ids: Vec<i64>,
        before: i64,
        limit: i64,
    ) -> Result<Vec<Session>> {
        let mut sessions = self.select(|s| session_ids.contains(&s.id) && s.start_time < before);
        sessions.sort_by_key(|s| std::cmp::Reverse(s.start_time));
        sessions.truncate(limit as usize);
        Ok(sessions)
    }

    async fn list_by_owner(&self, user_id: i64) -> Result<Vec<Session>> {
        Ok(self.select(|s| s.user_id == user_id))
    }

    async fn list_published_from(
        &self,
        from: i64,
        limit: i64,
        tag: Option<String>,
    ) -> Result<Vec<Session>> {
        let mut sessions = self.select(|s| {
            s.start_time >= from
                && s.is_draft != Some(true)
                && tag.as_ref().is_none_or(|tag| s.tags.contains(tag.as_str()))
        });
        sessions.sort_by_key(|s| s.start_time);
        sessions.truncate(limit as usize);
        Ok(sessions)
    }
}

#[derive(Default)]
pub struct InMemoryZoomTokenRepository {
    rows: Mutex<Rows<ZoomToken>>,
}

impl InMemoryZoomTokenRepository {
    pub fn all(&self) -> Vec<ZoomToken> {
        self.rows.lock().unwrap().items.clone()
    }
}

#[async_trait]
impl ZoomTokenRepository for InMemoryZoomTokenRepository {
    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<ZoomToken>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|t| t.user_id == user_id)
            .cloned())
    }

    async fn insert(&self, new_token: NewZoomToken) -> Result<ZoomToken> {
        let mut rows = self.rows.lock().unwrap();
        let now = Utc::now();
        let token = ZoomToken {
            id: rows.next_id(),
            created_at: now,
            updated_at: now,
            user_id: new_token.user_id,
            access_token: new_token.access_token,
            token_type: new_token.token_type,
            refresh_token: new_token.refresh_token,
            expires_in: new_token.expires_in,
            scope: new_token.scope,
        };
        rows.items.push(token.clone());
        Ok(token)
    }

    async fn update(&self, token: ZoomToken) -> Result<ZoomToken> {
        let mut rows = self.rows.lock().unwrap();
        let stored = rows
            .items
            .iter_mut()
            .find(|t| t.id == token.id)
            .ok_or(RepositoryError::NotFound)?;
        *stored = token.clone();
        Ok(token)
    }

    async fn delete_by_user_id(&self, user_id: i64) -> Result<usize> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.items.len();
        rows.items.retain(|t| t.user_id != user_id);
        Ok(before - rows.items.len())
    }
}

pub fn user(id: i64) -> User {
    User {
        id,
        created_at: Utc::now(),
        first_name: format!("First{id}"),
        last_name: format!("Last{id}"),
        email: format!("user{id}@example.com"),
        phone: "555-0100".to_string(),
        auth_zero_sub_id: format!("auth0|{id}"),
        profile_img_url: String::new(),
        banner_img_url: String::new(),
        name: format!("Host {id}"),
        description: String::new(),
        instagram_url: String::new(),
        facebook_url: String::new(),
        youtube_channel_url: String::new(),
        twitter_url: String::new(),
        tags: String::new(),
        zoom_app_installed: false,
        zoom_account_id: None,
    }
}

pub fn manual_session(user_id: i64, name: &str, start_time: i64, duration: i64) -> NewSession {
    NewSession {
        user_id,
        name: name.to_string(),
        start_time,
        duration,
        max_session_size: 10,
        cost: 1500,
        profile_img_url: "/img/p.png".to_string(),
        banner_img_url: "/img/b.png".to_string(),
        zoom_meeting_type: MeetingType::None,
        source: SessionSource::Manual,
        ..Default::default()
    }
}
