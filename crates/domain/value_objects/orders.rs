use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    entities::orders::{InsertOrderEntity, OrderEntity},
    errors::RepositoryError,
    value_objects::enums::{
        order_statuses::OrderStatus, payment_platforms::PaymentPlatform,
        transaction_types::TransactionType,
    },
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub customer_id: i64,
    pub payment_platform: PaymentPlatform,
    pub status: OrderStatus,
    pub transaction_type: TransactionType,
    pub payment_method_id: Option<String>,
    pub payment_platform_customer_id: String,
    pub payment_platform_order_id: String,
    pub amount: i64,
    pub email: String,
    pub tags: String,
    pub session_id: i64,
    pub session_name: String,
    pub session_description: String,
    pub session_date: i64,
}

impl TryFrom<OrderEntity> for Order {
    type Error = RepositoryError;

    fn try_from(entity: OrderEntity) -> Result<Self, Self::Error> {
        Ok(Self {
            id: entity.id,
            created_at: entity.created_at,
            customer_id: entity.customer_id,
            payment_platform: entity.payment_platform.parse()?,
            status: entity.status.parse()?,
            transaction_type: entity.transaction_type.parse()?,
            payment_method_id: entity.payment_method_id,
            payment_platform_customer_id: entity.payment_platform_customer_id,
            payment_platform_order_id: entity.payment_platform_order_id,
            amount: entity.amount,
            email: entity.email,
            tags: entity.tags,
            session_id: entity.session_id,
            session_name: entity.session_name,
            session_description: entity.session_description,
            session_date: entity.session_date,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer_id: i64,
    pub payment_platform: PaymentPlatform,
    pub transaction_type: TransactionType,
    pub payment_platform_customer_id: String,
    pub payment_platform_order_id: String,
    pub amount: i64,
    pub email: String,
    pub tags: String,
    pub session_id: i64,
    pub session_name: String,
    pub session_description: String,
    pub session_date: i64,
}

impl From<NewOrder> for InsertOrderEntity {
    fn from(order: NewOrder) -> Self {
        Self {
            customer_id: order.customer_id,
            payment_platform: order.payment_platform.as_str().to_string(),
            status: OrderStatus::Created.as_str().to_string(),
            transaction_type: order.transaction_type.as_str().to_string(),
            payment_platform_customer_id: order.payment_platform_customer_id,
            payment_platform_order_id: order.payment_platform_order_id,
            amount: order.amount,
            email: order.email,
            tags: order.tags,
            session_id: order.session_id,
            session_name: order.session_name,
            session_description: order.session_description,
            session_date: order.session_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateOrderRequest {
    pub session_id: i64,
    pub cost: i64,
    #[serde(default)]
    pub transaction_type: Option<TransactionType>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatedOrder {
    pub order: Order,
    pub client_secret: String,
}
