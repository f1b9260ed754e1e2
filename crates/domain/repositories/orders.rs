use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::{
    enums::order_statuses::OrderStatus,
    orders::{NewOrder, Order},
};

#[automock]
#[async_trait]
pub trait OrderRepository {
    async fn create(&self, new_order: NewOrder) -> Result<Order>;

    async fn find_by_payment_platform_order_id(
        &self,
        payment_platform_order_id: &str,
    ) -> Result<Option<Order>>;

    async fn update_status(
        &self,
        order_id: i64,
        status: OrderStatus,
        payment_method_id: Option<String>,
    ) -> Result<Order>;

    async fn list_succeeded_by_customer(&self, customer_id: i64, limit: i64)
    -> Result<Vec<Order>>;

    async fn has_succeeded_order(&self, customer_id: i64, session_id: i64) -> Result<bool>;
}
