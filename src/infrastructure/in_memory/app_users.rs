use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::repositories::app_users::AppUserRepository;

/// A thread-safe in-memory set of known user ids.
#[derive(Default, Clone)]
pub struct InMemoryAppUserStore {
    users: Arc<RwLock<HashSet<Uuid>>>,
}

impl InMemoryAppUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, user_id: Uuid) {
        self.users.write().await.insert(user_id);
    }
}

#[async_trait]
impl AppUserRepository for InMemoryAppUserStore {
    async fn exists(&self, user_id: Uuid) -> Result<bool> {
        Ok(self.users.read().await.contains(&user_id))
    }
}
