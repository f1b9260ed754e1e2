use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::errors::RepositoryError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentPlatform {
    #[default]
    Stripe,
}

impl PaymentPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentPlatform::Stripe => "STRIPE",
        }
    }
}

impl Display for PaymentPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentPlatform {
    type Err = RepositoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "STRIPE" => Ok(PaymentPlatform::Stripe),
            other => Err(RepositoryError::UnknownVariant {
                kind: "payment platform",
                value: other.to_string(),
            }),
        }
    }
}
