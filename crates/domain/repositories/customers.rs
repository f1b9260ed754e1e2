use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;

use crate::domain::value_objects::customers::{Customer, NewCustomer};

#[automock]
#[async_trait]
pub trait CustomerRepository {
    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Customer>>;

    async fn create(&self, new_customer: NewCustomer) -> Result<Customer>;
}
