use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::zoom_tokens::{NewZoomToken, ZoomToken};

#[automock]
#[async_trait]
pub trait ZoomTokenRepository {
    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<ZoomToken>>;

    async fn insert(&self, new_token: NewZoomToken) -> Result<ZoomToken>;

    async fn update(&self, token: ZoomToken) -> Result<ZoomToken>;

    async fn delete_by_user_id(&self, user_id: i64) -> Result<usize>;
}
