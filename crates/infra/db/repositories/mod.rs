pub mod customers;
pub mod images;
pub mod orders;
pub mod sessions;
pub mod users;
pub mod zoom_tokens;
