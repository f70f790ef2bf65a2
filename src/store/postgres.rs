//! Postgres-backed stores.
//!
//! Every query that touches `todos` carries `user_id = $n` bound from the
//! [`AuthenticatedUser`]; there is no statement in this file that can read or
//! write a task by id alone.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use uuid::Uuid;

use super::{bounded, StoreError, TaskStore, UserStore};
use crate::auth::AuthenticatedUser;
use crate::config::Config;
use crate::models::{NewTask, Task, TaskPatch, User, UserId};

const USER_COLUMNS: &str = "id, email, password_hash, created_at, updated_at";
const TASK_COLUMNS: &str = "id, title, completed, user_id, created_at, updated_at";

/// Create a bounded PostgreSQL connection pool.
///
/// Acquiring a connection shares the store timeout, so an exhausted pool surfaces
/// as a timeout rather than a hang.
pub async fn create_pool(config: &Config) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.store_timeout)
        .connect(&config.database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgUserStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        bounded(self.timeout, "users.create", async {
            sqlx::query_as::<_, User>(&format!(
                "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {}",
                USER_COLUMNS
            ))
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                    StoreError::DuplicateEmail
                }
                other => other.into(),
            })
        })
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        bounded(self.timeout, "users.get_by_email", async {
            sqlx::query_as::<_, User>(&format!(
                "SELECT {} FROM users WHERE email = $1",
                USER_COLUMNS
            ))
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
        })
        .await
    }

    async fn get_user_by_id(&self, id: UserId) -> Result<User, StoreError> {
        bounded(self.timeout, "users.get_by_id", async {
            sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(StoreError::NotFound)
        })
        .await
    }
}

#[derive(Clone)]
pub struct PgTaskStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgTaskStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn create(&self, owner: &AuthenticatedUser, task: NewTask) -> Result<Task, StoreError> {
        bounded(self.timeout, "todos.create", async {
            sqlx::query_as::<_, Task>(&format!(
                "INSERT INTO todos (title, completed, user_id) VALUES ($1, $2, $3) RETURNING {}",
                TASK_COLUMNS
            ))
            .bind(&task.title)
            .bind(task.completed)
            .bind(owner.user_id())
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::from)
        })
        .await
    }

    async fn list(&self, owner: &AuthenticatedUser) -> Result<Vec<Task>, StoreError> {
        bounded(self.timeout, "todos.list", async {
            sqlx::query_as::<_, Task>(&format!(
                "SELECT {} FROM todos WHERE user_id = $1 ORDER BY created_at DESC",
                TASK_COLUMNS
            ))
            .bind(owner.user_id())
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from)
        })
        .await
    }

    async fn get(&self, owner: &AuthenticatedUser, id: Uuid) -> Result<Task, StoreError> {
        bounded(self.timeout, "todos.get", async {
            sqlx::query_as::<_, Task>(&format!(
                "SELECT {} FROM todos WHERE id = $1 AND user_id = $2",
                TASK_COLUMNS
            ))
            .bind(id)
            .bind(owner.user_id())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
        })
        .await
    }

    async fn apply_patch(
        &self,
        owner: &AuthenticatedUser,
        id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, StoreError> {
        // COALESCE keeps unsupplied columns; one statement, so no check-then-act gap.
        bounded(self.timeout, "todos.update", async {
            sqlx::query_as::<_, Task>(&format!(
                "UPDATE todos \
                 SET title = COALESCE($1, title), \
                     completed = COALESCE($2, completed), \
                     updated_at = NOW() \
                 WHERE id = $3 AND user_id = $4 \
                 RETURNING {}",
                TASK_COLUMNS
            ))
            .bind(patch.title)
            .bind(patch.completed)
            .bind(id)
            .bind(owner.user_id())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
        })
        .await
    }

    async fn delete(&self, owner: &AuthenticatedUser, id: Uuid) -> Result<(), StoreError> {
        bounded(self.timeout, "todos.delete", async {
            let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
                .bind(id)
                .bind(owner.user_id())
                .execute(&self.pool)
                .await?;

            match result.rows_affected() {
                1 => Ok(()),
                0 => Err(StoreError::NotFound),
                n => Err(StoreError::Database(format!(
                    "delete of task {} affected {} rows",
                    id, n
                ))),
            }
        })
        .await
    }
}
