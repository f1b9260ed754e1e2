use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::errors::RepositoryError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    #[default]
    Purchase,
    Donation,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Purchase => "PURCHASE",
            TransactionType::Donation => "DONATION",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = RepositoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "PURCHASE" => Ok(TransactionType::Purchase),
            "DONATION" => Ok(TransactionType::Donation),
            other => Err(RepositoryError::UnknownVariant {
                kind: "transaction type",
                value: other.to_string(),
            }),
        }
    }
}
