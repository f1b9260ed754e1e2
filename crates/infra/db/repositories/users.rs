use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*, update};
use std::sync::Arc;

use crate::{
    domain::{
        entities::users::{InsertUserEntity, UpdateUserEntity, UserEntity},
        errors::RepositoryError,
        repositories::users::UserRepository,
        value_objects::users::{NewUser, User, UserChanges},
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::users},
};

pub struct UserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl UserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl UserRepository for UserPostgres {
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = users::table
            .filter(users::id.eq(user_id))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(row.map(User::from))
    }

    async fn find_by_ids(&self, user_ids: Vec<i64>) -> Result<Vec<User>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = users::table
            .filter(users::id.eq_any(user_ids))
            .select(UserEntity::as_select())
            .load::<UserEntity>(&mut conn)?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_by_auth_sub(&self, auth_zero_sub_id: &str) -> Result<Option<User>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = users::table
            .filter(users::auth_zero_sub_id.eq(auth_zero_sub_id))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(row.map(User::from))
    }

    async fn create(&self, new_user: NewUser) -> Result<User> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(users::table)
            .values(&InsertUserEntity::from(new_user))
            .returning(UserEntity::as_returning())
            .get_result::<UserEntity>(&mut conn)?;

        Ok(User::from(row))
    }

    async fn update(&self, user_id: i64, changes: UserChanges) -> Result<User> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = update(users::table.filter(users::id.eq(user_id)))
            .set(&UpdateUserEntity::from(changes))
            .returning(UserEntity::as_returning())
            .get_result::<UserEntity>(&mut conn)
            .optional()?
            .ok_or(RepositoryError::NotFound)?;

        Ok(User::from(row))
    }

    async fn find_by_zoom_account_id(&self, zoom_account_id: &str) -> Result<Option<User>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = users::table
            .filter(users::zoom_account_id.eq(zoom_account_id))
            .select(UserEntity::as_select())
            .first::<UserEntity>(&mut conn)
            .optional()?;

        Ok(row.map(User::from))
    }

    async fn mark_zoom_installed(&self, user_id: i64, zoom_account_id: &str) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table.filter(users::id.eq(user_id)))
            .set((
                users::zoom_app_installed.eq(true),
                users::zoom_account_id.eq(Some(zoom_account_id)),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn clear_zoom_installation(&self, user_id: i64) -> Result<()> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        update(users::table.filter(users::id.eq(user_id)))
            .set((
                users::zoom_app_installed.eq(false),
                users::zoom_account_id.eq(None::<String>),
                users::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
