use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

#[async_trait]
#[automock]
pub trait AppUserRepository {
    async fn exists(&self, user_id: Uuid) -> Result<bool>;
}
