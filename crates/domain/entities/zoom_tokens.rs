use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::zoom_tokens;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = zoom_tokens)]
pub struct ZoomTokenEntity {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: i64,
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub scope: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = zoom_tokens)]
pub struct InsertZoomTokenEntity {
    pub user_id: i64,
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub scope: String,
}
