use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::users::{NewUser, User, UserChanges};

#[automock]
#[async_trait]
pub trait UserRepository {
    async fn find_by_id(&self, user_id: i64) -> Result<Option<User>>;

    async fn find_by_ids(&self, user_ids: Vec<i64>) -> Result<Vec<User>>;

    async fn find_by_auth_sub(&self, auth_zero_sub_id: &str) -> Result<Option<User>>;

    async fn create(&self, new_user: NewUser) -> Result<User>;

    /// Fails with `RepositoryError::NotFound` when no row has this id.
    async fn update(&self, user_id: i64, changes: UserChanges) -> Result<User>;

    async fn find_by_zoom_account_id(&self, zoom_account_id: &str) -> Result<Option<User>>;

    async fn mark_zoom_installed(&self, user_id: i64, zoom_account_id: &str) -> Result<()>;

    async fn clear_zoom_installation(&self, user_id: i64) -> Result<()>;
}
