use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::domain::errors::RepositoryError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    ProviderCreated,
    Succeeded,
    Failed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::ProviderCreated => "PROVIDER_CREATED",
            OrderStatus::Succeeded => "SUCCEEDED",
            OrderStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Succeeded | OrderStatus::Failed)
    }

    /// created -> provider-created -> succeeded | failed. Payment webhooks can
    /// arrive out of order, so a late `created` after `succeeded` is ignored.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        match (self, next) {
            (OrderStatus::Created, OrderStatus::ProviderCreated)
            | (OrderStatus::Created, OrderStatus::Succeeded)
            | (OrderStatus::Created, OrderStatus::Failed)
            | (OrderStatus::ProviderCreated, OrderStatus::Succeeded)
            | (OrderStatus::ProviderCreated, OrderStatus::Failed) => true,
            _ => false,
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = RepositoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CREATED" => Ok(OrderStatus::Created),
            "PROVIDER_CREATED" => Ok(OrderStatus::ProviderCreated),
            "SUCCEEDED" => Ok(OrderStatus::Succeeded),
            "FAILED" => Ok(OrderStatus::Failed),
            other => Err(RepositoryError::UnknownVariant {
                kind: "order status",
                value: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_orders_never_move() {
        assert!(OrderStatus::Created.can_transition_to(OrderStatus::ProviderCreated));
        assert!(OrderStatus::ProviderCreated.can_transition_to(OrderStatus::Succeeded));
        assert!(!OrderStatus::Succeeded.can_transition_to(OrderStatus::ProviderCreated));
        assert!(!OrderStatus::Failed.can_transition_to(OrderStatus::Succeeded));
        assert!(!OrderStatus::ProviderCreated.can_transition_to(OrderStatus::Created));
    }
}
