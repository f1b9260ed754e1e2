use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{
    entities::customers::{CustomerEntity, InsertCustomerEntity},
    errors::RepositoryError,
    value_objects::enums::payment_platforms::PaymentPlatform,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Customer {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub user_id: i64,
    pub payment_platform: PaymentPlatform,
    pub payment_platform_customer_id: String,
    pub email: String,
}

impl TryFrom<CustomerEntity> for Customer {
    type Error = RepositoryError;

    fn try_from(entity: CustomerEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            created_at: entity.created_at,
            user_id: entity.user_id,
            payment_platform: entity.payment_platform.parse()?,
            payment_platform_customer_id: entity.payment_platform_customer_id,
            email: entity.email,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    pub user_id: i64,
    pub payment_platform: PaymentPlatform,
    pub payment_platform_customer_id: String,
    pub email: String,
}

impl From<NewCustomer> for InsertCustomerEntity {
    fn from(customer: NewCustomer) -> Self {
        Self {
            user_id: customer.user_id,
            payment_platform: customer.payment_platform.as_str().to_string(),
            payment_platform_customer_id: customer.payment_platform_customer_id,
            email: customer.email,
        }
    }
}
