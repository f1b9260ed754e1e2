use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::sessions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = sessions)]
pub struct SessionEntity {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub start_time: i64,
    pub duration: i64,
    pub max_session_size: i32,
    pub cost_cents: i64,
    pub meeting_url: Option<String>,
    pub profile_img_url: String,
    pub banner_img_url: String,
    pub tags: String,
    pub zoom_password: Option<String>,
    pub is_draft: Option<bool>,
    pub zoom_meeting_id: Option<i64>,
    pub zoom_meeting_join_url: Option<String>,
    pub zoom_meeting_start_url: Option<String>,
    pub zoom_occurrence_id: Option<String>,
    pub zoom_meeting_type: String,
    pub zoom_sync_enabled: Option<bool>,
    pub source: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = sessions)]
pub struct InsertSessionEntity {
    pub user_id: i64,
    pub name: String,
    pub description: String,
    pub start_time: i64,
    pub duration: i64,
    pub max_session_size: i32,
    pub cost_cents: i64,
    pub meeting_url: Option<String>,
    pub profile_img_url: String,
    pub banner_img_url: String,
    pub tags: String,
    pub zoom_password: Option<String>,
    pub is_draft: Option<bool>,
    pub zoom_meeting_id: Option<i64>,
    pub zoom_meeting_join_url: Option<String>,
    pub zoom_meeting_start_url: Option<String>,
    pub zoom_occurrence_id: Option<String>,
    pub zoom_meeting_type: String,
    pub zoom_sync_enabled: Option<bool>,
    pub source: String,
}

/// `None` leaves a column untouched; `Some(None)` writes NULL.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = sessions)]
pub struct UpdateSessionEntity {
    pub updated_at: Option<DateTime<Utc>>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<i64>,
    pub duration: Option<i64>,
    pub max_session_size: Option<i32>,
    pub cost_cents: Option<i64>,
    pub meeting_url: Option<Option<String>>,
    pub profile_img_url: Option<String>,
    pub banner_img_url: Option<String>,
    pub tags: Option<String>,
    pub zoom_password: Option<Option<String>>,
    pub is_draft: Option<Option<bool>>,
    pub zoom_meeting_id: Option<Option<i64>>,
    pub zoom_meeting_join_url: Option<Option<String>>,
    pub zoom_meeting_start_url: Option<Option<String>>,
    pub zoom_meeting_type: Option<String>,
    pub zoom_sync_enabled: Option<Option<bool>>,
}
