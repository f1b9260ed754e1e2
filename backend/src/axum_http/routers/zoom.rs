use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    axum_http::wiring::{ZoomInstall, ZoomWebhook},
    usecases::zoom_webhook::{WebhookOutcome, WebhookSignature},
};

const SIGNATURE_HEADER: &str = "x-zm-signature";
const TIMESTAMP_HEADER: &str = "x-zm-request-timestamp";

pub struct ZoomState {
    pub webhook: Arc<ZoomWebhook>,
    pub install: Arc<ZoomInstall>,
    pub redirect_success_uri: String,
}

pub fn routes(
    webhook: Arc<ZoomWebhook>,
    install: Arc<ZoomInstall>,
    redirect_success_uri: String,
) -> Router {
    Router::new()
        .route("/install", get(install_url))
        .route("/oauth/callback", get(oauth_callback))
        .route("/webhook", post(webhook_event))
        .with_state(Arc::new(ZoomState {
            webhook,
            install,
            redirect_success_uri,
        }))
}

#[derive(Debug, Serialize)]
pub struct InstallUrlResponse {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: String,
    pub state: String,
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub async fn install_url(State(state): State<Arc<ZoomState>>, auth: AuthUser) -> Response {
    match state.install.install_url(auth.user_id) {
        Ok(url) => (StatusCode::OK, Json(InstallUrlResponse { url })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn oauth_callback(
    State(state): State<Arc<ZoomState>>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Response {
    match state
        .install
        .complete_install(&query.state, &query.code)
        .await
    {
        Ok(_) => Redirect::to(&state.redirect_success_uri).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn webhook_event(
    State(state): State<Arc<ZoomState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let delivery_id = Uuid::new_v4();
    let signature = WebhookSignature {
        timestamp: header_value(&headers, TIMESTAMP_HEADER),
        signature: header_value(&headers, SIGNATURE_HEADER),
    };

    let outcome = state
        .webhook
        .handle(&body, signature)
        .instrument(info_span!("zoom_webhook", %delivery_id))
        .await;

    match outcome {
        Ok(WebhookOutcome::UrlValidation(response)) => {
            info!(%delivery_id, "zoom router: url validation answered");
            (StatusCode::OK, Json(response)).into_response()
        }
        Ok(WebhookOutcome::Acknowledged) => StatusCode::OK.into_response(),
        Err(err) => err.into_response(),
    }
}
