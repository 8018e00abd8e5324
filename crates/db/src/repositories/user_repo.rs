//! Repository for accounts.

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::memory::{MemoryStore, USER_PREFIX};
use crate::models::user::{CreateUser, User};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Register an account. Emails are unique, compared case-insensitively.
    async fn create(&self, input: &CreateUser) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// The earliest registered account, if any.
    async fn first(&self) -> Result<Option<User>, StoreError>;
}

#[async_trait]
impl UserRepo for MemoryStore {
    async fn create(&self, input: &CreateUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.email.eq_ignore_ascii_case(&input.email))
        {
            return Err(StoreError::Conflict("Email already exists".into()));
        }
        let user = User {
            id: tables.next_id(USER_PREFIX),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            name: format!("{} {}", input.first_name, input.last_name).trim().to_string(),
            email: input.email.clone(),
            company: input.company.clone(),
            password_hash: input.password_hash.clone(),
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn first(&self) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.first().cloned())
    }
}
