use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::{PasswordHasher, TokenService};
use crate::config::Config;
use crate::store::memory::{MemoryTaskStore, MemoryUserStore};
use crate::store::postgres::{PgTaskStore, PgUserStore};
use crate::store::{TaskStore, UserStore};

/// Everything a handler needs, shared across workers.
///
/// Nothing in here is mutated after startup apart from what the stores guard
/// themselves.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub tokens: Arc<TokenService>,
    pub passwords: PasswordHasher,
}

impl AppState {
    /// Postgres-backed state for the server binary.
    pub fn postgres(pool: PgPool, config: &Config) -> Self {
        Self {
            users: Arc::new(PgUserStore::new(pool.clone(), config.store_timeout)),
            tasks: Arc::new(PgTaskStore::new(pool, config.store_timeout)),
            tokens: Arc::new(TokenService::new(config.jwt_secret.as_bytes(), config.token_ttl)),
            passwords: PasswordHasher::new(config.bcrypt_cost),
        }
    }

    /// Fresh in-memory stores around the given token service and hasher.
    pub fn in_memory(tokens: TokenService, passwords: PasswordHasher) -> Self {
        Self {
            users: Arc::new(MemoryUserStore::new()),
            tasks: Arc::new(MemoryTaskStore::new()),
            tokens: Arc::new(tokens),
            passwords,
        }
    }
}
