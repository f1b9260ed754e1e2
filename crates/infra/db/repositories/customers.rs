use anyhow::Result;
use async_trait::async_trait;
use diesel::{OptionalExtension, RunQueryDsl, insert_into, prelude::*};
use std::sync::Arc;

use crate::{
    domain::{
        entities::customers::{CustomerEntity, InsertCustomerEntity},
        repositories::customers::CustomerRepository,
        value_objects::customers::{Customer, NewCustomer},
    },
    infra::db::postgres::{postgres_connection::PgPoolSquad, schema::customers},
};

pub struct CustomerPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl CustomerPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl CustomerRepository for CustomerPostgres {
    async fn find_by_user_id(&self, user_id: i64) -> Result<Option<Customer>> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = customers::table
            .filter(customers::user_id.eq(user_id))
            .select(CustomerEntity::as_select())
            .first::<CustomerEntity>(&mut conn)
            .optional()?;

        Ok(row.map(Customer::try_from).transpose()?)
    }

    async fn create(&self, new_customer: NewCustomer) -> Result<Customer> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let row = insert_into(customers::table)
            .values(&InsertCustomerEntity::from(new_customer))
            .returning(CustomerEntity::as_returning())
            .get_result::<CustomerEntity>(&mut conn)?;

        Ok(Customer::try_from(row)?)
    }
}
