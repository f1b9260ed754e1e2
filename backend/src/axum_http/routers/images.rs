use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
};
use crates::domain::value_objects::enums::upload_statuses::UploadStatus;
use serde::Deserialize;

use crate::{auth::AuthUser, axum_http::wiring::Images};

#[derive(Debug, Deserialize)]
pub struct CreateImageBody {
    pub object_id: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateImageStatusBody {
    pub status: UploadStatus,
    #[serde(default)]
    pub serving_url: Option<String>,
}

pub fn routes(images: Arc<Images>) -> Router {
    Router::new()
        .route("/", post(create_image))
        .route("/:object_id/status", patch(update_image_status))
        .with_state(images)
}

pub async fn create_image(
    State(images): State<Arc<Images>>,
    auth: AuthUser,
    Json(body): Json<CreateImageBody>,
) -> impl IntoResponse {
    match images.create_image(auth.user_id, body.object_id).await {
        Ok(image) => (StatusCode::CREATED, Json(image)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update_image_status(
    State(images): State<Arc<Images>>,
    auth: AuthUser,
    Path(object_id): Path<String>,
    Json(body): Json<UpdateImageStatusBody>,
) -> impl IntoResponse {
    match images
        .update_status(auth.user_id, &object_id, body.status, body.serving_url)
        .await
    {
        Ok(image) => (StatusCode::OK, Json(image)).into_response(),
        Err(err) => err.into_response(),
    }
}
