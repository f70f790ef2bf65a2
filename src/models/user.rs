use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Store-assigned identifier of a user; also the `sub` claim of access tokens.
pub type UserId = i64;

/// A registered account.
///
/// `password_hash` is loaded for login but is never serialized, so returning a
/// `User` from a handler cannot leak it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
