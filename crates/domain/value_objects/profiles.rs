use serde::Serialize;

use crate::domain::value_objects::{
    sessions::SessionBuckets,
    users::{PublicUser, User},
    zoom_tokens::ZoomToken,
};

/// The caller's own profile carries private fields; everyone else gets the
/// public projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProfileUser {
    Private(User),
    Public(PublicUser),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserProfile {
    pub user: ProfileUser,
    pub hosted: SessionBuckets,
    pub ordered: SessionBuckets,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_token: Option<ZoomToken>,
}
