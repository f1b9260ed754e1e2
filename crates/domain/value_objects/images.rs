use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    entities::images::{ImageEntity, InsertImageEntity},
    errors::RepositoryError,
    value_objects::enums::upload_statuses::UploadStatus,
};

/// A user-uploaded picture tracked by its storage object id. The serving URL
/// is only known once the upload succeeded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Image {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub status: UploadStatus,
    pub serving_url: String,
    pub object_id: String,
}

impl TryFrom<ImageEntity> for Image {
    type Error = RepositoryError;

    fn try_from(entity: ImageEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            created_at: entity.created_at,
            user_id: entity.user_id,
            status: entity.status.parse()?,
            serving_url: entity.serving_url,
            object_id: entity.object_id,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewImage {
    pub user_id: i64,
    pub object_id: String,
}

impl From<NewImage> for InsertImageEntity {
    fn from(image: NewImage) -> Self {
        Self {
            user_id: image.user_id,
            status: UploadStatus::Started.as_str().to_string(),
            serving_url: String::new(),
            object_id: image.object_id,
        }
    }
}
