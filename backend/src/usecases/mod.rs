pub mod errors;
pub mod gateways;
pub mod hydration;
pub mod images;
pub mod orders;
pub mod retry;
pub mod session_sync;
pub mod sessions;
pub mod users;
pub mod zoom_install;
pub mod zoom_tokens;
pub mod zoom_webhook;

#[cfg(test)]
mod test_support;
