//! In-process stores with the same contracts as the Postgres ones.
//!
//! Each store keeps its rows behind one mutex, so the email uniqueness check and
//! the insert, or the owner match and the mutation, happen under a single lock.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::{StoreError, TaskStore, UserStore};
use crate::auth::AuthenticatedUser;
use crate::models::{NewTask, Task, TaskPatch, User, UserId};

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|_| StoreError::Database("store lock poisoned".into()))
}

#[derive(Default)]
struct UserTable {
    next_id: UserId,
    rows: Vec<User>,
}

#[derive(Default)]
pub struct MemoryUserStore {
    table: Mutex<UserTable>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut table = lock(&self.table)?;
        if table.rows.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }

        table.next_id += 1;
        let now = Utc::now();
        let user = User {
            id: table.next_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        table.rows.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        let table = lock(&self.table)?;
        table
            .rows
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError> {
        let table = lock(&self.table)?;
        table
            .rows
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

/// Tasks in insertion order; iterating backwards yields newest first.
#[derive(Default)]
pub struct MemoryTaskStore {
    rows: Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, owner: &AuthenticatedUser, task: NewTask) -> Result<Task, StoreError> {
        let task = Task::new(task, owner.user_id());
        lock(&self.rows)?.push(task.clone());
        Ok(task)
    }

    async fn list(&self, owner: &AuthenticatedUser) -> Result<Vec<Task>, StoreError> {
        let rows = lock(&self.rows)?;
        Ok(rows
            .iter()
            .rev()
            .filter(|t| t.user_id == owner.user_id())
            .cloned()
            .collect())
    }

    async fn get(&self, owner: &AuthenticatedUser, id: Uuid) -> Result<Task, StoreError> {
        let rows = lock(&self.rows)?;
        rows.iter()
            .find(|t| t.id == id && t.user_id == owner.user_id())
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn apply_patch(
        &self,
        owner: &AuthenticatedUser,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, StoreError> {
        let mut rows = lock(&self.rows)?;
        let task = rows
            .iter_mut()
            .find(|t| t.id == id && t.user_id == owner.user_id())
            .ok_or(StoreError::NotFound)?;
        patch.apply_to(task);
        Ok(task.clone())
    }

    async fn delete(&self, owner: &AuthenticatedUser, id: Uuid) -> Result<(), StoreError> {
        let mut rows = lock(&self.rows)?;
        let before = rows.len();
        rows.retain(|t| !(t.id == id && t.user_id == owner.user_id()));

        match before - rows.len() {
            1 => Ok(()),
            0 => Err(StoreError::NotFound),
            n => Err(StoreError::Database(format!(
                "delete of task {} affected {} rows",
                id, n
            ))),
        }
    }
}
