use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use crates::domain::value_objects::users::UserChanges;

use crate::{
    auth::{AuthSubject, AuthUser},
    axum_http::wiring::{Hydration, Images, SessionSync, Users},
};

pub struct UsersState {
    pub users: Arc<Users>,
    pub images: Arc<Images>,
    pub hydration: Arc<Hydration>,
    pub sync: Arc<SessionSync>,
}

pub fn routes(
    users: Arc<Users>,
    images: Arc<Images>,
    hydration: Arc<Hydration>,
    sync: Arc<SessionSync>,
) -> Router {
    Router::new()
        .route("/me", get(current_account).put(update_current_account))
        .route("/me/images", get(my_images))
        .route("/me/zoom/sync", post(sync_zoom_meetings))
        .route("/:user_id", get(get_user).put(update_user))
        .route("/:user_id/profile", get(profile))
        .route("/:user_id/sessions", get(hosted_sessions))
        .with_state(Arc::new(UsersState {
            users,
            images,
            hydration,
            sync,
        }))
}

/// Creates the account on first sign-in, then answers with the caller's
/// own profile.
pub async fn current_account(
    State(state): State<Arc<UsersState>>,
    subject: AuthSubject,
) -> impl IntoResponse {
    let user = match state
        .users
        .get_or_create_by_subject(&subject.subject, subject.email)
        .await
    {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };
    match state.hydration.hydrate_user_profile(user.id, Some(user.id)).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update_current_account(
    State(state): State<Arc<UsersState>>,
    subject: AuthSubject,
    Json(changes): Json<UserChanges>,
) -> impl IntoResponse {
    match state.users.update_by_subject(&subject.subject, changes).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn get_user(
    State(state): State<Arc<UsersState>>,
    viewer: Option<AuthUser>,
    Path(user_id): Path<i64>,
) -> impl IntoResponse {
    let viewer_id = viewer.map(|viewer| viewer.user_id);
    match state.users.get_user(user_id, viewer_id).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update_user(
    State(state): State<Arc<UsersState>>,
    auth: AuthUser,
    Path(user_id): Path<i64>,
    Json(changes): Json<UserChanges>,
) -> impl IntoResponse {
    match state.users.update_user(auth.user_id, user_id, changes).await {
        Ok(user) => (StatusCode::OK, Json(user)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn my_images(
    State(state): State<Arc<UsersState>>,
    auth: AuthUser,
) -> impl IntoResponse {
    match state.images.list_images(auth.user_id).await {
        Ok(images) => (StatusCode::OK, Json(images)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn profile(
    State(state): State<Arc<UsersState>>,
    viewer: Option<AuthUser>,
    Path(user_id): Path<i64>,
) -> impl IntoResponse {
    let viewer_id = viewer.map(|viewer| viewer.user_id);
    match state.hydration.hydrate_user_profile(user_id, viewer_id).await {
        Ok(profile) => (StatusCode::OK, Json(profile)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn hosted_sessions(
    State(state): State<Arc<UsersState>>,
    Path(user_id): Path<i64>,
) -> impl IntoResponse {
    match state.hydration.list_by_owner(user_id).await {
        Ok(sessions) => (StatusCode::OK, Json(sessions)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn sync_zoom_meetings(
    State(state): State<Arc<UsersState>>,
    auth: AuthUser,
) -> impl IntoResponse {
    match state.sync.sync_user_meetings(auth.user_id).await {
        Ok(report) => (StatusCode::OK, Json(report)).into_response(),
        Err(err) => err.into_response(),
    }
}
