use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::orders;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = orders)]
pub struct OrderEntity {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub customer_id: i64,
    pub payment_platform: String,
    pub status: String,
    pub transaction_type: String,
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

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = orders)]
pub struct InsertOrderEntity {
    pub customer_id: i64,
    pub payment_platform: String,
    pub status: String,
    pub transaction_type: String,
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
