use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::Utc;
use crates::domain::value_objects::{
    enums::session_sources::SessionSource,
    sessions::{NewSession, SessionChanges},
};
use serde::Deserialize;

use crate::{
    auth::AuthUser,
    axum_http::wiring::{Hydration, Sessions},
};

pub struct SessionsState {
    pub sessions: Arc<Sessions>,
    pub hydration: Arc<Hydration>,
}

pub fn routes(sessions: Arc<Sessions>, hydration: Arc<Hydration>) -> Router {
    Router::new()
        .route("/", get(list_published).post(create))
        .route("/:session_id", get(get_one).patch(update).delete(remove))
        .with_state(Arc::new(SessionsState {
            sessions,
            hydration,
        }))
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionBody {
    #[serde(flatten)]
    pub session: NewSession,
    #[serde(default)]
    pub create_in_zoom: bool,
}

#[derive(Debug, Deserialize)]
pub struct PublishedQuery {
    pub from: Option<i64>,
    pub limit: Option<i64>,
    pub tag: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PropagateQuery {
    pub propagate: Option<bool>,
}

pub async fn create(
    State(state): State<Arc<SessionsState>>,
    auth: AuthUser,
    Json(body): Json<CreateSessionBody>,
) -> impl IntoResponse {
    let mut session = body.session;
    session.user_id = auth.user_id;
    session.source = SessionSource::Manual;

    match state
        .sessions
        .create_session(session, body.create_in_zoom)
        .await
    {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn list_published(
    State(state): State<Arc<SessionsState>>,
    Query(query): Query<PublishedQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or_else(|| Utc::now().timestamp());
    match state
        .hydration
        .list_published(from, query.limit, query.tag)
        .await
    {
        Ok(sessions) => (StatusCode::OK, Json(sessions)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn get_one(
    State(state): State<Arc<SessionsState>>,
    viewer: Option<AuthUser>,
    Path(session_id): Path<i64>,
) -> impl IntoResponse {
    let viewer_id = viewer.map(|viewer| viewer.user_id);
    match state.hydration.get_session(session_id, viewer_id).await {
        Ok(session) => (StatusCode::OK, Json(session)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn update(
    State(state): State<Arc<SessionsState>>,
    auth: AuthUser,
    Path(session_id): Path<i64>,
    Query(query): Query<PropagateQuery>,
    Json(changes): Json<SessionChanges>,
) -> impl IntoResponse {
    let propagate = query.propagate.unwrap_or(true);
    match state
        .sessions
        .update_session(auth.user_id, session_id, changes, propagate)
        .await
    {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn remove(
    State(state): State<Arc<SessionsState>>,
    auth: AuthUser,
    Path(session_id): Path<i64>,
) -> impl IntoResponse {
    match state.sessions.delete_session(auth.user_id, session_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => err.into_response(),
    }
}
