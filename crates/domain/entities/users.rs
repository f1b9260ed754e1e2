use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::users;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = users)]
pub struct UserEntity {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub auth_zero_sub_id: String,
    pub profile_img_url: String,
    pub banner_img_url: String,
    pub name: String,
    pub description: String,
    pub instagram_url: String,
    pub facebook_url: String,
    pub youtube_channel_url: String,
    pub twitter_url: String,
    pub tags: String,
    pub zoom_app_installed: bool,
    pub zoom_account_id: Option<String>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub struct InsertUserEntity {
    pub auth_zero_sub_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub profile_img_url: String,
    pub banner_img_url: String,
    pub name: String,
    pub description: String,
    pub instagram_url: String,
    pub facebook_url: String,
    pub youtube_channel_url: String,
    pub twitter_url: String,
    pub tags: String,
    pub zoom_app_installed: bool,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = users)]
pub struct UpdateUserEntity {
    pub updated_at: Option<DateTime<Utc>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_img_url: Option<String>,
    pub banner_img_url: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub instagram_url: Option<String>,
    pub facebook_url: Option<String>,
    pub youtube_channel_url: Option<String>,
    pub twitter_url: Option<String>,
    pub tags: Option<String>,
}
