use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::errors::RepositoryError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadStatus {
    Started,
    Succeeded,
    Failed,
}

impl UploadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Started => "STARTED",
            UploadStatus::Succeeded => "SUCCEEDED",
            UploadStatus::Failed => "FAILED",
        }
    }
}

impl Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadStatus {
    type Err = RepositoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "STARTED" => Ok(UploadStatus::Started),
            "SUCCEEDED" => Ok(UploadStatus::Succeeded),
            "FAILED" => Ok(UploadStatus::Failed),
            other => Err(RepositoryError::UnknownVariant {
                kind: "upload status",
                value: other.to_string(),
            }),
        }
    }
}
