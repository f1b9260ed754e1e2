use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::{
    enums::upload_statuses::UploadStatus,
    images::{Image, NewImage},
};

#[automock]
#[async_trait]
pub trait ImageRepository {
    /// Newest first.
    async fn list_succeeded_by_user(&self, user_id: i64, limit: i64) -> Result<Vec<Image>>;

    async fn find_by_object_id(&self, object_id: &str) -> Result<Option<Image>>;

    async fn create(&self, new_image: NewImage) -> Result<Image>;

    /// A `None` serving URL keeps the stored one.
    async fn update_status(
        &self,
        object_id: &str,
        status: UploadStatus,
        serving_url: Option<String>,
    ) -> Result<Image>;
}
