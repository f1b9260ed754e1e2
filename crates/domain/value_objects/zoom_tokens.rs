use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::zoom_tokens::{InsertZoomTokenEntity, ZoomTokenEntity};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoomToken {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: i64,
    pub access_token: String,
    pub token_type: String,
    #[serde(skip_serializing)]
    pub refresh_token: String,
    pub expires_in: i64,
    pub scope: String,
}

impl From<ZoomTokenEntity> for ZoomToken {
    fn from(entity: ZoomTokenEntity) -> Self {
        Self {
            id: entity.id,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            user_id: entity.user_id,
            access_token: entity.access_token,
            token_type: entity.token_type,
            refresh_token: entity.refresh_token,
            expires_in: entity.expires_in,
            scope: entity.scope,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewZoomToken {
    pub user_id: i64,
    pub access_token: String,
    pub token_type: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub scope: String,
}

impl From<NewZoomToken> for InsertZoomTokenEntity {
    fn from(token: NewZoomToken) -> Self {
        Self {
            user_id: token.user_id,
            access_token: token.access_token,
            token_type: token.token_type,
            refresh_token: token.refresh_token,
            expires_in: token.expires_in,
            scope: token.scope,
        }
    }
}
