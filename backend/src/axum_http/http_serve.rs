use crate::{
    axum_http::{default_routers, routers, wiring},
    config::config_model::DotEnvyConfig,
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use crates::infra::db::postgres::postgres_connection::PgPoolSquad;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let usecases = wiring::build(&config, db_pool)?;

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/sessions",
            routers::sessions::routes(
                Arc::clone(&usecases.sessions),
                Arc::clone(&usecases.hydration),
            ),
        )
        .nest(
            "/api/v1/users",
            routers::users::routes(
                Arc::clone(&usecases.users),
                Arc::clone(&usecases.images),
                Arc::clone(&usecases.hydration),
                Arc::clone(&usecases.sync),
            ),
        )
        .nest(
            "/api/v1/images",
            routers::images::routes(Arc::clone(&usecases.images)),
        )
        .nest(
            "/api/v1/zoom",
            routers::zoom::routes(
                Arc::clone(&usecases.zoom_webhook),
                Arc::clone(&usecases.zoom_install),
                config.zoom.redirect_success_uri.clone(),
            ),
        )
        .nest(
            "/api/v1/orders",
            routers::orders::routes(Arc::clone(&usecases.orders)),
        )
        .nest(
            "/api/v1/stripe",
            routers::stripe_webhook::routes(Arc::clone(&usecases.orders)),
        )
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([AUTHORIZATION, CONTENT_TYPE])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server is running on port {}", config.backend_server.port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to install CTRL+C signal handler");
        std::future::pending::<()>().await;
    }
    info!("Received ctrl+C signal");
}
