use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::error::AppError;
use crate::models::UserId;

/// The verified principal of a request.
///
/// Only [`TokenService::authenticate`](super::TokenService::authenticate) can build
/// one outside this crate, and `AuthMiddleware` is what calls it for HTTP traffic.
/// Every `TaskStore` operation requires this value, so an unauthenticated code path
/// into task storage does not type-check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: UserId,
}

impl AuthenticatedUser {
    pub(crate) fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

/// Reads the principal that `AuthMiddleware` stored in request extensions.
///
/// A handler using this extractor on a route without the middleware answers 401
/// instead of running.
impl FromRequest for AuthenticatedUser {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<AuthenticatedUser>().copied() {
            Some(user) => ready(Ok(user)),
            None => {
                log::error!("No authenticated user on request to {}", req.path());
                let err = AppError::Unauthorized("Authentication required".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
