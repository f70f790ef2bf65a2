//! Storage seams for credentials and owner-scoped tasks.
//!
//! Both stores are traits so the HTTP layer holds `Arc<dyn UserStore>` and
//! `Arc<dyn TaskStore>` without caring whether Postgres or the in-memory backend
//! sits behind them. Every `TaskStore` operation takes an [`AuthenticatedUser`],
//! which only the token verifier can produce, so there is no way to reach a task
//! without a verified owner bound into the lookup.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use uuid::Uuid;

use crate::auth::AuthenticatedUser;
use crate::models::{NewTask, Task, TaskPatch, User, UserId};

/// Default upper bound for a single storage operation.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
pub enum StoreError {
    /// No matching row. For tasks this also covers rows owned by someone else.
    NotFound,
    /// The email is already registered (unique constraint).
    DuplicateEmail,
    /// A task patch carried no fields.
    InvalidPatch,
    /// The operation did not finish within the store timeout.
    Timeout(&'static str),
    /// Any other storage failure.
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::NotFound => write!(f, "record not found"),
            StoreError::DuplicateEmail => write!(f, "email already registered"),
            StoreError::InvalidPatch => write!(f, "patch contains no fields"),
            StoreError::Timeout(op) => write!(f, "{} timed out", op),
            StoreError::Database(msg) => write!(f, "database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match error {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            sqlx::Error::PoolTimedOut => StoreError::Timeout("connection acquire"),
            _ => StoreError::Database(error.to_string()),
        }
    }
}

/// Runs `operation` with an upper bound of `limit`.
///
/// On expiry the inner future is dropped, which returns any pooled connection it
/// held.
pub async fn bounded<T, F>(
    limit: Duration,
    name: &'static str,
    operation: F,
) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => {
            log::warn!("Store operation {} exceeded {:?}", name, limit);
            Err(StoreError::Timeout(name))
        }
    }
}

/// Persistence for user credentials.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Email uniqueness is arbitrated by the store itself, so of
    /// two concurrent calls with the same email exactly one succeeds.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError>;

    async fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError>;
}

/// Task persistence scoped to a single verified owner.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, owner: &AuthenticatedUser, task: NewTask) -> Result<Task, StoreError>;

    /// All of the owner's tasks, newest first.
    async fn list(&self, owner: &AuthenticatedUser) -> Result<Vec<Task>, StoreError>;

    async fn get(&self, owner: &AuthenticatedUser, id: Uuid) -> Result<Task, StoreError>;

    /// Applies `patch` to the owner's task.
    ///
    /// An empty patch is rejected with `InvalidPatch` before the backend is touched.
    async fn update(
        &self,
        owner: &AuthenticatedUser,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, StoreError> {
        if patch.is_empty() {
            return Err(StoreError::InvalidPatch);
        }
        self.apply_patch(owner, id, patch).await
    }

    /// Backend half of [`TaskStore::update`]; `patch` is never empty here. Must read,
    /// merge and write in one atomic step.
    async fn apply_patch(
        &self,
        owner: &AuthenticatedUser,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, StoreError>;

    /// Deletes the owner's task, failing with `NotFound` unless exactly one row went.
    async fn delete(&self, owner: &AuthenticatedUser, id: Uuid) -> Result<(), StoreError>;
}
