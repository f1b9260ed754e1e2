use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use tracing::warn;

use crate::axum_http::{error_responses::AppError, wiring::Orders};

const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

pub fn routes(orders: Arc<Orders>) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .with_state(orders)
}

pub async fn webhook(
    State(orders): State<Arc<Orders>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let Some(signature) = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
    else {
        warn!("stripe_webhook: missing signature header");
        return AppError::BadRequest("missing Stripe-Signature header".to_string())
            .into_response();
    };

    match orders.handle_stripe_event(&body, signature).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => AppError::from(err).into_response(),
    }
}
