use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::infra::db::postgres::schema::images;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = images)]
pub struct ImageEntity {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: i64,
    pub status: String,
    pub serving_url: String,
    pub object_id: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = images)]
pub struct InsertImageEntity {
    pub user_id: i64,
    pub status: String,
    pub serving_url: String,
    pub object_id: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = images)]
pub struct UpdateImageStatusEntity {
    pub updated_at: DateTime<Utc>,
    pub status: String,
    pub serving_url: Option<String>,
}
