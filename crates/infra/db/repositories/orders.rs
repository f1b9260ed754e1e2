use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use diesel::{OptionalExtension, RunQueryDsl, dsl::exists, insert_into, prelude::*, select, update};
use std::sync::Arc;

use crate::{
    domain::{
        entities::orders::{InsertOrderEntity, OrderEntity},
        errors::RepositoryError,
        repositories::orders::OrderRepository,
        value_objects::{
            enums::order_statuses::OrderStatus,
            orders::{NewOrder, Order},
        },
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::orders},
};

pub struct OrderPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl OrderPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl OrderRepository for OrderPostgres {
    async fn create(&self, new_order: NewOrder) -> Result<Order> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(orders::table)
            .values(&InsertOrderEntity::from(new_order))
            .returning(OrderEntity::as_returning())
            .get_result::<OrderEntity>(&mut conn)?;

        Ok(Order::try_from(row)?)
    }

    async fn find_by_payment_platform_order_id(
        &self,
        payment_platform_order_id: &str,
    ) -> Result<Option<Order>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = orders::table
            .filter(orders::payment_platform_order_id.eq(payment_platform_order_id))
            .select(OrderEntity::as_select())
            .first::<OrderEntity>(&mut conn)
            .optional()?;

        Ok(row.map(Order::try_from).transpose()?)
    }

    async fn update_status(
        &self,
        order_id: i64,
        status: OrderStatus,
        payment_method_id: Option<String>,
    ) -> Result<Order> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let target = orders::table.filter(orders::id.eq(order_id));
        let row = match payment_method_id {
            Some(payment_method_id) => update(target)
                .set((
                    orders::status.eq(status.as_str()),
                    orders::payment_method_id.eq(Some(payment_method_id)),
                    orders::updated_at.eq(Utc::now()),
                ))
                .returning(OrderEntity::as_returning())
                .get_result::<OrderEntity>(&mut conn)
                .optional()?,
            None => update(target)
                .set((
                    orders::status.eq(status.as_str()),
                    orders::updated_at.eq(Utc::now()),
                ))
                .returning(OrderEntity::as_returning())
                .get_result::<OrderEntity>(&mut conn)
                .optional()?,
        }
        .ok_or(RepositoryError::NotFound)?;

        Ok(Order::try_from(row)?)
    }

    async fn list_succeeded_by_customer(
        &self,
        customer_id: i64,
        limit: i64,
    ) -> Result<Vec<Order>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let rows = orders::table
            .filter(orders::customer_id.eq(customer_id))
            .filter(orders::status.eq(OrderStatus::Succeeded.as_str()))
            .order(orders::id.desc())
            .limit(limit)
            .select(OrderEntity::as_select())
            .load::<OrderEntity>(&mut conn)?;

        rows.into_iter()
            .map(|row| Order::try_from(row).map_err(anyhow::Error::from))
            .collect()
    }

    async fn has_succeeded_order(&self, customer_id: i64, session_id: i64) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let purchased = select(exists(
            orders::table
                .filter(orders::customer_id.eq(customer_id))
                .filter(orders::session_id.eq(session_id))
                .filter(orders::status.eq(OrderStatus::Succeeded.as_str())),
        ))
        .get_result::<bool>(&mut conn)?;

        Ok(purchased)
    }
}
