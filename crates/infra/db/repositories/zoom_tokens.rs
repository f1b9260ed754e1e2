use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, RunQueryDsl, delete, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain::{
        entities::zoom_tokens::{InsertZoomTokenEntity, ZoomTokenEntity},
        errors::RepositoryError,
        repositories::zoom_tokens::ZoomTokenRepository,
        value_objects::zoom_tokens::{NewZoomToken, ZoomToken},
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::zoom_tokens},
};

pub struct ZoomTokenPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl ZoomTokenPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl ZoomTokenRepository for ZoomTokenPostgres {
    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<ZoomToken>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = zoom_tokens::table
            .filter(zoom_tokens::user_id.eq(user_id))
            .order(zoom_tokens::id.desc())
            .select(ZoomTokenEntity::as_select())
            .first::<ZoomTokenEntity>(&mut conn)
            .optional()?;

        Ok(row.map(ZoomToken::from))
    }

    async fn insert(&self, new_token: NewZoomToken) -> Result<ZoomToken> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(zoom_tokens::table)
            .values(&InsertZoomTokenEntity::from(new_token))
            .returning(ZoomTokenEntity::as_returning())
            .get_result::<ZoomTokenEntity>(&mut conn)?;

        Ok(row.into())
    }

    async fn update(&self, token: ZoomToken) -> Result<ZoomToken> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = update(zoom_tokens::table.filter(zoom_tokens::id.eq(token.id)))
            .set((
                zoom_tokens::access_token.eq(&token.access_token),
                zoom_tokens::token_type.eq(&token.token_type),
                zoom_tokens::refresh_token.eq(&token.refresh_token),
                zoom_tokens::expires_in.eq(token.expires_in),
                zoom_tokens::scope.eq(&token.scope),
                zoom_tokens::updated_at.eq(Utc::now()),
            ))
            .returning(ZoomTokenEntity::as_returning())
            .get_result::<ZoomTokenEntity>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    async fn delete_by_user_id(&self, user_id: i64) -> Result<usize> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let deleted =
            delete(zoom_tokens::table.filter(zoom_tokens::user_id.eq(user_id))).execute(&mut conn)?;

        Ok(deleted)
    }
}
