use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain::{
        entities::images::{ImageEntity, InsertImageEntity, UpdateImageStatusEntity},
        errors::RepositoryError,
        repositories::images::ImageRepository,
        value_objects::{
            enums::upload_statuses::UploadStatus,
            images::{Image, NewImage},
        },
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::images},
};

pub struct ImagePostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ImagePostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ImageRepository for ImagePostgres {
    async fn list_succeeded_by_user(&self, user_id: i64, limit: i64) -> Result<Vec<Image>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = images::table
            .filter(images::user_id.eq(user_id))
            .filter(images::status.eq(UploadStatus::Succeeded.as_str()))
            .order(images::created_at.desc())
            .limit(limit)
            .select(ImageEntity::as_select())
            .load::<ImageEntity>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(Image::try_from)
            .collect::<Result<Vec<_>, _>>()?)
    }

    async fn find_by_object_id(&self, object_id: &str) -> Result<Option<Image>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = images::table
            .filter(images::object_id.eq(object_id))
            .select(ImageEntity::as_select())
            .first::<ImageEntity>(&mut conn)
            .optional()?;

        Ok(row.map(Image::try_from).transpose()?)
    }

    async fn create(&self, new_image: NewImage) -> Result<Image> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(images::table)
            .values(&InsertImageEntity::from(new_image))
            .returning(ImageEntity::as_returning())
            .get_result::<ImageEntity>(&mut conn)?;

        Ok(Image::try_from(row)?)
    }

    async fn update_status(
        &self,
        object_id: &str,
        status: UploadStatus,
        serving_url: Option<String>,
    ) -> Result<Image> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = update(images::table.filter(images::object_id.eq(object_id)))
            .set(&UpdateImageStatusEntity {
                updated_at: Utc::now(),
                status: status.as_str().to_string(),
                serving_url,
            })
            .returning(ImageEntity::as_returning())
            .get_result::<ImageEntity>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(Image::try_from(row)?)
    }
}
