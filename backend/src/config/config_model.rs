#[derive(Debug, Clone)]
pub struct DotEnvyConfig {
    pub backend_server: BackendServer,
    pub database: Database,
    pub zoom: Zoom,
    pub unsplash: Unsplash,
    pub stripe: Stripe,
}

#[derive(Debug, Clone)]
pub struct BackendServer {
    pub port: u16,
    pub body_limit: u64,
    pub timeout: u64,
}

#[derive(Debug, Clone)]
pub struct Database {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct Zoom {
    pub client_key: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub redirect_success_uri: String,
    /// Signature checks and URL validation are off when unset.
    pub webhook_secret_token: Option<String>,
    pub api_base_url: String,
    pub oauth_base_url: String,
    pub http_timeout_secs: u64,
    pub retry_delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct Unsplash {
    pub base_url: String,
    pub access_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Stripe {
    pub api_base_url: String,
    pub secret_key: String,
    pub webhook_secret: String,
}

#[derive(Debug, Clone)]
pub struct AuthSecret {
    pub secret: String,
}
