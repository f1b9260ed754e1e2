pub mod images;
pub mod orders;
pub mod sessions;
pub mod stripe_webhook;
pub mod users;
pub mod zoom;
