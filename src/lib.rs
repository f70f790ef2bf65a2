#![doc = "The `todoforge` library crate."]
#![doc = ""]
#![doc = "Authentication (password hashing, access tokens, the bearer-token gate),"]
#![doc = "owner-scoped task storage, routing and error handling for the todoforge API."]
#![doc = "The binary in `main.rs` only loads configuration, opens the pool and serves"]
#![doc = "`routes::configure`."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;

pub use crate::error::AppError;
pub use crate::state::AppState;
