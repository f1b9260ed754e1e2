use std::sync::Arc;

use crates::domain::{
    errors::RepositoryError,
    repositories::images::ImageRepository,
    value_objects::{
        enums::upload_statuses::UploadStatus,
        images::{Image, NewImage},
    },
};
use tracing::{error, info};

use super::errors::{UseCaseError, UseCaseResult};

pub const IMAGE_LIST_LIMIT: i64 = 50;

/// Upload records. Signing the upload itself happens elsewhere; this only
/// tracks the object through STARTED -> SUCCEEDED | FAILED.
pub struct ImageUseCase<I>
where
    I: ImageRepository + Send + Sync + 'static,
{
    image_repo: Arc<I>,
}

impl<I> ImageUseCase<I>
where
    I: ImageRepository + Send + Sync + 'static,
{
    pub fn new(image_repo: Arc<I>) -> Self {
        Self { image_repo }
    }

    pub async fn list_images(&self, user_id: i64) -> UseCaseResult<Vec<Image>> {
        self.image_repo
            .list_succeeded_by_user(user_id, IMAGE_LIST_LIMIT)
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "images: failed to list images");
                UseCaseError::Internal(err)
            })
    }

    pub async fn create_image(&self, user_id: i64, object_id: String) -> UseCaseResult<Image> {
        if object_id.trim().is_empty() {
            return Err(UseCaseError::Validation(
                "object id is required".to_string(),
            ));
        }

        let image = self
            .image_repo
            .create(NewImage { user_id, object_id })
            .await
            .map_err(|err| {
                error!(user_id, db_error = ?err, "images: failed to create image");
                UseCaseError::Internal(err)
            })?;
        info!(user_id, image_id = image.id, object_id = %image.object_id, "images: upload started");
        Ok(image)
    }

    /// A succeeded upload must come with the URL it is served from.
    pub async fn update_status(
        &self,
        user_id: i64,
        object_id: &str,
        status: UploadStatus,
        serving_url: Option<String>,
    ) -> UseCaseResult<Image> {
        let serving_url = serving_url.filter(|url| !url.trim().is_empty());
        if status == UploadStatus::Succeeded && serving_url.is_none() {
            return Err(UseCaseError::Validation(
                "a succeeded upload needs a serving url".to_string(),
            ));
        }

        let stored = self
            .image_repo
            .find_by_object_id(object_id)
            .await
            .map_err(|err| {
                error!(user_id, object_id, db_error = ?err, "images: lookup failed");
                UseCaseError::Internal(err)
            })?;
        match stored {
            Some(image) if image.user_id == user_id => {}
            _ => return Err(UseCaseError::NotFound(format!("image {object_id}"))),
        }

        let image = self
            .image_repo
            .update_status(object_id, status, serving_url)
            .await
            .map_err(|err| {
                if RepositoryError::is_not_found(&err) {
                    UseCaseError::NotFound(format!("image {object_id}"))
                } else {
                    error!(user_id, object_id, db_error = ?err, "images: failed to update status");
                    UseCaseError::Internal(err)
                }
            })?;
        info!(user_id, object_id, status = %image.status, "images: upload status updated");
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use crates::domain::repositories::images::MockImageRepository;
    use mockall::predicate::eq;

    fn image(user_id: i64, object_id: &str, status: UploadStatus) -> Image {
        Image {
            id: 1,
            created_at: Utc::now(),
            user_id,
            status,
            serving_url: String::new(),
            object_id: object_id.to_string(),
        }
    }

    #[tokio::test]
    async fn new_upload_starts_in_started() {
        let mut repo = MockImageRepository::new();
        repo.expect_create()
            .withf(|new_image| new_image.user_id == 4 && new_image.object_id == "obj-1")
            .times(1)
            .returning(|new_image| Ok(image(new_image.user_id, &new_image.object_id, UploadStatus::Started)));

        let created = ImageUseCase::new(Arc::new(repo))
            .create_image(4, "obj-1".to_string())
            .await
            .unwrap();

        assert_eq!(created.status, UploadStatus::Started);
    }

    #[tokio::test]
    async fn blank_object_id_is_rejected() {
        let mut repo = MockImageRepository::new();
        repo.expect_create().never();

        let err = ImageUseCase::new(Arc::new(repo))
            .create_image(4, " ".to_string())
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Validation(_)));
    }

    #[tokio::test]
    async fn listing_asks_for_the_newest_fifty() {
        let mut repo = MockImageRepository::new();
        repo.expect_list_succeeded_by_user()
            .with(eq(4), eq(IMAGE_LIST_LIMIT))
            .times(1)
            .returning(|user_id, _| Ok(vec![image(user_id, "obj-1", UploadStatus::Succeeded)]));

        let images = ImageUseCase::new(Arc::new(repo)).list_images(4).await.unwrap();

        assert_eq!(images.len(), 1);
    }

    #[tokio::test]
    async fn success_requires_a_serving_url() {
        let mut repo = MockImageRepository::new();
        repo.expect_update_status().never();

        let err = ImageUseCase::new(Arc::new(repo))
            .update_status(4, "obj-1", UploadStatus::Succeeded, Some(String::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::Validation(_)));
    }

    #[tokio::test]
    async fn success_records_the_serving_url() {
        let mut repo = MockImageRepository::new();
        repo.expect_find_by_object_id()
            .returning(|object_id| Ok(Some(image(4, object_id, UploadStatus::Started))));
        repo.expect_update_status()
            .withf(|object_id, status, url| {
                object_id == "obj-1"
                    && *status == UploadStatus::Succeeded
                    && url.as_deref() == Some("https://img.example/obj-1")
            })
            .times(1)
            .returning(|object_id, status, url| {
                let mut updated = image(4, object_id, status);
                updated.serving_url = url.unwrap_or_default();
                Ok(updated)
            });

        let updated = ImageUseCase::new(Arc::new(repo))
            .update_status(
                4,
                "obj-1",
                UploadStatus::Succeeded,
                Some("https://img.example/obj-1".to_string()),
            )
            .await
            .unwrap();

        assert_eq!(updated.status, UploadStatus::Succeeded);
        assert_eq!(updated.serving_url, "https://img.example/obj-1");
    }

    #[tokio::test]
    async fn another_users_upload_is_not_found() {
        let mut repo = MockImageRepository::new();
        repo.expect_find_by_object_id()
            .returning(|object_id| Ok(Some(image(9, object_id, UploadStatus::Started))));
        repo.expect_update_status().never();

        let err = ImageUseCase::new(Arc::new(repo))
            .update_status(4, "obj-1", UploadStatus::Failed, None)
            .await
            .unwrap_err();

        assert!(matches!(err, UseCaseError::NotFound(_)));
    }
}
