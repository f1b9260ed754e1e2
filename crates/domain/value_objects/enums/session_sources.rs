use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::errors::RepositoryError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionSource {
    #[default]
    Manual,
    ZoomWebhook,
}

impl SessionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionSource::Manual => "MANUAL",
            SessionSource::ZoomWebhook => "ZOOM_WEBHOOK",
        }
    }
}

impl Display for SessionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionSource {
    type Err = RepositoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "MANUAL" => Ok(SessionSource::Manual),
            "ZOOM_WEBHOOK" => Ok(SessionSource::ZoomWebhook),
            other => Err(RepositoryError::UnknownVariant {
                kind: "session source",
                value: other.to_string(),
            }),
        }
    }
}
