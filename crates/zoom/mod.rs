pub mod oauth_state;
pub mod payloads;
pub mod webhook;
pub mod zoom_client;
