use anyhow::Result;
use async_trait::async_trait;
use diesel::{RunQueryDsl, dsl::exists, prelude::*, select};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::repositories::app_users::AppUserRepository,
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::app_users},
};

pub struct AppUserPostgres {
    db_pool: Arc<PgPoolSquad>,
}

impl AppUserPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl AppUserRepository for AppUserPostgres {
    async fn exists(&self, user_id: Uuid) -> Result<bool> {
        let mut conn = Arc::clone(&self.db_pool).get()?;

        let result = select(exists(app_users::table.filter(app_users::id.eq(user_id))))
            .get_result::<bool>(&mut conn)?;

        Ok(result)
    }
}
