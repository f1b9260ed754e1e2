use std::str::FromStr;

use anyhow::{Context, Result};
use crates::{
    images::unsplash_client::DEFAULT_UNSPLASH_BASE_URL,
    payments::stripe_client::DEFAULT_STRIPE_API_BASE_URL,
};

use super::config_model::{
    AuthSecret, BackendServer, Database, DotEnvyConfig, Stripe, Unsplash, Zoom,
};

const DEFAULT_ZOOM_API_BASE_URL: &str = "https://api.zoom.us/v2";
const DEFAULT_ZOOM_OAUTH_BASE_URL: &str = "https://zoom.us";
const DEFAULT_ZOOM_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_ZOOM_RETRY_DELAY_MS: u64 = 2_000;
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parsed<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(key)?
        .parse()
        .with_context(|| format!("{key} is invalid"))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(key) {
        Some(value) => value.parse().with_context(|| format!("{key} is invalid")),
        None => Ok(default),
    }
}

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: parsed("SERVER_PORT_BACKEND")?,
        body_limit: parsed("SERVER_BODY_LIMIT")?,
        timeout: parsed("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
        max_connections: parsed_or(
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_DATABASE_MAX_CONNECTIONS,
        )?,
    };

    let zoom = Zoom {
        client_key: required("ZOOM_CLIENT_KEY")?,
        client_secret: required("ZOOM_CLIENT_SECRET")?,
        redirect_uri: required("ZOOM_REDIRECT_URI")?,
        redirect_success_uri: required("ZOOM_REDIRECT_SUCCESS_URI")?,
        webhook_secret_token: optional("ZOOM_WEBHOOK_SECRET_TOKEN"),
        api_base_url: optional("ZOOM_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_ZOOM_API_BASE_URL.to_string()),
        oauth_base_url: optional("ZOOM_OAUTH_BASE_URL")
            .unwrap_or_else(|| DEFAULT_ZOOM_OAUTH_BASE_URL.to_string()),
        http_timeout_secs: parsed_or("ZOOM_HTTP_TIMEOUT_SECS", DEFAULT_ZOOM_HTTP_TIMEOUT_SECS)?,
        retry_delay_ms: parsed_or("ZOOM_RETRY_DELAY_MS", DEFAULT_ZOOM_RETRY_DELAY_MS)?,
    };

    let unsplash = Unsplash {
        base_url: optional("UNSPLASH_BASE_URL")
            .unwrap_or_else(|| DEFAULT_UNSPLASH_BASE_URL.to_string()),
        access_key: optional("UNSPLASH_ACCESS_KEY"),
    };

    let stripe = Stripe {
        api_base_url: optional("STRIPE_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_STRIPE_API_BASE_URL.to_string()),
        secret_key: required("STRIPE_SECRET_KEY")?,
        webhook_secret: required("STRIPE_WEBHOOK_SECRET")?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        zoom,
        unsplash,
        stripe,
    })
}

pub fn get_auth_secret() -> Result<AuthSecret> {
    dotenvy::dotenv().ok();

    Ok(AuthSecret {
        secret: required("JWT_SECRET")?,
    })
}
