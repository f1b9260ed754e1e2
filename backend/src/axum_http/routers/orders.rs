use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use crates::domain::value_objects::orders::CreateOrderRequest;

use crate::{auth::AuthUser, axum_http::wiring::Orders};

pub fn routes(orders: Arc<Orders>) -> Router {
    Router::new()
        .route("/", post(create_order))
        .with_state(orders)
}

pub async fn create_order(
    State(orders): State<Arc<Orders>>,
    auth: AuthUser,
    Json(request): Json<CreateOrderRequest>,
) -> impl IntoResponse {
    match orders.create_order(auth.user_id, request).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(err) => err.into_response(),
    }
}
