use std::{sync::Arc, time::Duration};

use anyhow::Result;
use crates::{
    images::unsplash_client::UnsplashClient,
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            customers::CustomerPostgres, images::ImagePostgres, orders::OrderPostgres,
            sessions::SessionPostgres, users::UserPostgres, zoom_tokens::ZoomTokenPostgres,
        },
    },
    payments::stripe_client::StripeClient,
    zoom::zoom_client::{ZoomClient, ZoomClientConfig},
};
use tracing::info;

use crate::{
    config::config_model::DotEnvyConfig,
    usecases::{
        gateways::SeededPasswordSource,
        hydration::HydrationUseCase,
        images::ImageUseCase,
        orders::OrderUseCase,
        retry::RetryPolicy,
        session_sync::SessionSyncUseCase,
        sessions::SessionUseCase,
        users::UserUseCase,
        zoom_install::ZoomInstallUseCase,
        zoom_tokens::ZoomTokenUseCase,
        zoom_webhook::ZoomWebhookUseCase,
    },
};

pub type Tokens = ZoomTokenUseCase<SessionPostgres, UserPostgres, ZoomTokenPostgres, ZoomClient>;
pub type Sessions = SessionUseCase<SessionPostgres, UserPostgres, ZoomTokenPostgres, ZoomClient>;
pub type SessionSync =
    SessionSyncUseCase<SessionPostgres, UserPostgres, ZoomTokenPostgres, ZoomClient>;
pub type Hydration = HydrationUseCase<
    SessionPostgres,
    UserPostgres,
    ZoomTokenPostgres,
    ZoomClient,
    CustomerPostgres,
    OrderPostgres,
>;
pub type Orders =
    OrderUseCase<SessionPostgres, UserPostgres, CustomerPostgres, OrderPostgres, StripeClient>;
pub type Users = UserUseCase<UserPostgres>;
pub type Images = ImageUseCase<ImagePostgres>;
pub type ZoomWebhook =
    ZoomWebhookUseCase<SessionPostgres, UserPostgres, ZoomTokenPostgres, ZoomClient>;
pub type ZoomInstall =
    ZoomInstallUseCase<SessionPostgres, UserPostgres, ZoomTokenPostgres, ZoomClient>;

/// Everything the routers need. Built once so the per-meeting locks in
/// `SessionSync` are shared by every entry point.
pub struct UseCases {
    pub sessions: Arc<Sessions>,
    pub sync: Arc<SessionSync>,
    pub hydration: Arc<Hydration>,
    pub orders: Arc<Orders>,
    pub users: Arc<Users>,
    pub images: Arc<Images>,
    pub zoom_webhook: Arc<ZoomWebhook>,
    pub zoom_install: Arc<ZoomInstall>,
}

pub fn build(config: &DotEnvyConfig, db_pool: Arc<PgPoolSquad>) -> Result<UseCases> {
    let session_repo = Arc::new(SessionPostgres::new(Arc::clone(&db_pool)));
    let user_repo = Arc::new(UserPostgres::new(Arc::clone(&db_pool)));
    let token_repo = Arc::new(ZoomTokenPostgres::new(Arc::clone(&db_pool)));
    let customer_repo = Arc::new(CustomerPostgres::new(Arc::clone(&db_pool)));
    let order_repo = Arc::new(OrderPostgres::new(Arc::clone(&db_pool)));
    let image_repo = Arc::new(ImagePostgres::new(Arc::clone(&db_pool)));

    let http_timeout = Duration::from_secs(config.zoom.http_timeout_secs);
    let zoom_client = Arc::new(ZoomClient::new(ZoomClientConfig {
        api_base_url: config.zoom.api_base_url.clone(),
        oauth_base_url: config.zoom.oauth_base_url.clone(),
        client_key: config.zoom.client_key.clone(),
        client_secret: config.zoom.client_secret.clone(),
        redirect_uri: config.zoom.redirect_uri.clone(),
        timeout: http_timeout,
    })?);
    let unsplash_client = Arc::new(UnsplashClient::new(
        config.unsplash.base_url.clone(),
        config.unsplash.access_key.clone(),
        http_timeout,
    )?);
    let stripe_client = Arc::new(StripeClient::new(
        config.stripe.api_base_url.clone(),
        config.stripe.secret_key.clone(),
        config.stripe.webhook_secret.clone(),
        http_timeout,
    )?);

    let retry = RetryPolicy::new(
        RetryPolicy::DEFAULT_ATTEMPTS,
        Duration::from_millis(config.zoom.retry_delay_ms),
    );

    let tokens = Arc::new(ZoomTokenUseCase::new(
        Arc::clone(&session_repo),
        Arc::clone(&user_repo),
        token_repo,
        Arc::clone(&zoom_client),
        retry,
    ));
    let sessions = Arc::new(SessionUseCase::new(
        Arc::clone(&session_repo),
        Arc::clone(&user_repo),
        Arc::clone(&tokens),
        Arc::clone(&zoom_client),
        unsplash_client,
        Arc::new(SeededPasswordSource::from_entropy()),
    ));
    let sync = Arc::new(SessionSyncUseCase::new(
        Arc::clone(&session_repo),
        Arc::clone(&sessions),
        Arc::clone(&tokens),
        Arc::clone(&zoom_client),
        retry,
    ));
    let hydration = Arc::new(HydrationUseCase::new(
        Arc::clone(&session_repo),
        Arc::clone(&user_repo),
        Arc::clone(&customer_repo),
        Arc::clone(&order_repo),
        Arc::clone(&tokens),
    ));
    let orders = Arc::new(OrderUseCase::new(
        session_repo,
        Arc::clone(&user_repo),
        customer_repo,
        order_repo,
        stripe_client,
    ));
    let users = Arc::new(UserUseCase::new(Arc::clone(&user_repo)));
    let images = Arc::new(ImageUseCase::new(image_repo));
    let zoom_webhook = Arc::new(ZoomWebhookUseCase::new(
        Arc::clone(&user_repo),
        Arc::clone(&sync),
        Arc::clone(&tokens),
        config.zoom.webhook_secret_token.clone(),
    ));
    let zoom_install = Arc::new(ZoomInstallUseCase::new(
        user_repo,
        tokens,
        Arc::clone(&sync),
        zoom_client,
        config.zoom.client_secret.clone(),
    ));

    info!(
        zoom_webhook_signed = config.zoom.webhook_secret_token.is_some(),
        unsplash_enabled = config.unsplash.access_key.is_some(),
        "wiring: use cases built"
    );

    Ok(UseCases {
        sessions,
        sync,
        hydration,
        orders,
        users,
        images,
        zoom_webhook,
        zoom_install,
    })
}
