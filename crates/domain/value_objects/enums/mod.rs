pub mod meeting_types;
pub mod order_statuses;
pub mod payment_platforms;
pub mod session_sources;
pub mod transaction_types;
pub mod upload_statuses;
