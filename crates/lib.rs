pub mod domain;
pub mod images;
pub mod infra;
pub mod observability;
pub mod payments;
pub mod zoom;
