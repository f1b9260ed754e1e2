use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::users::{InsertUserEntity, UpdateUserEntity, UserEntity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub created_at: DateTime<Utc>,
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

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            created_at: entity.created_at,
            first_name: entity.first_name,
            last_name: entity.last_name,
            email: entity.email,
            phone: entity.phone,
            auth_zero_sub_id: entity.auth_zero_sub_id,
            profile_img_url: entity.profile_img_url,
            banner_img_url: entity.banner_img_url,
            name: entity.name,
            description: entity.description,
            instagram_url: entity.instagram_url,
            facebook_url: entity.facebook_url,
            youtube_channel_url: entity.youtube_channel_url,
            twitter_url: entity.twitter_url,
            tags: entity.tags,
            zoom_app_installed: entity.zoom_app_installed,
            zoom_account_id: entity.zoom_account_id,
        }
    }
}

/// What other users may see: no contact details, auth subject or Zoom linkage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub name: String,
    pub description: String,
    pub profile_img_url: String,
    pub banner_img_url: String,
    pub instagram_url: String,
    pub facebook_url: String,
    pub youtube_channel_url: String,
    pub twitter_url: String,
    pub tags: String,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            name: user.name.clone(),
            description: user.description.clone(),
            profile_img_url: user.profile_img_url.clone(),
            banner_img_url: user.banner_img_url.clone(),
            instagram_url: user.instagram_url.clone(),
            facebook_url: user.facebook_url.clone(),
            youtube_channel_url: user.youtube_channel_url.clone(),
            twitter_url: user.twitter_url.clone(),
            tags: user.tags.clone(),
        }
    }
}

/// A fresh account keyed by the identity provider subject. Profile fields
/// start empty and are filled in through `UserChanges`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub auth_zero_sub_id: String,
    pub email: String,
}

impl From<NewUser> for InsertUserEntity {
    fn from(user: NewUser) -> Self {
        Self {
            auth_zero_sub_id: user.auth_zero_sub_id,
            email: user.email,
            first_name: String::new(),
            last_name: String::new(),
            phone: String::new(),
            profile_img_url: String::new(),
            banner_img_url: String::new(),
            name: String::new(),
            description: String::new(),
            instagram_url: String::new(),
            facebook_url: String::new(),
            youtube_channel_url: String::new(),
            twitter_url: String::new(),
            tags: String::new(),
            zoom_app_installed: false,
        }
    }
}

/// Profile edit. Absent fields are left as they are. The auth subject and
/// Zoom linkage are not editable here.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct UserChanges {
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

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        *self == UserChanges::default()
    }
}

impl From<UserChanges> for UpdateUserEntity {
    fn from(changes: UserChanges) -> Self {
        Self {
            updated_at: Some(Utc::now()),
            first_name: changes.first_name,
            last_name: changes.last_name,
            email: changes.email,
            phone: changes.phone,
            profile_img_url: changes.profile_img_url,
            banner_img_url: changes.banner_img_url,
            name: changes.name,
            description: changes.description,
            instagram_url: changes.instagram_url,
            facebook_url: changes.facebook_url,
            youtube_channel_url: changes.youtube_channel_url,
            twitter_url: changes.twitter_url,
            tags: changes.tags,
        }
    }
}
