pub mod customers;
pub mod enums;
pub mod images;
pub mod orders;
pub mod profiles;
pub mod sessions;
pub mod users;
pub mod zoom_tokens;
