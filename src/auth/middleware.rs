use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    Error, HttpMessage, ResponseError,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::fmt;
use std::sync::Arc;

use super::extractors::AuthenticatedUser;
use super::token::{TokenError, TokenService};
use crate::error::AppError;

/// Why the gate turned a request away.
#[derive(Debug, PartialEq, Eq)]
pub enum GateRejection {
    MissingHeader,
    MalformedHeader,
    Token(TokenError),
}

impl fmt::Display for GateRejection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GateRejection::MissingHeader => write!(f, "missing authorization header"),
            GateRejection::MalformedHeader => write!(f, "malformed authorization header"),
            GateRejection::Token(e) => write!(f, "{}", e),
        }
    }
}

impl From<GateRejection> for AppError {
    fn from(rejection: GateRejection) -> AppError {
        match rejection {
            GateRejection::MissingHeader => {
                AppError::Unauthorized("Authorization header required".into())
            }
            GateRejection::MalformedHeader => {
                AppError::Unauthorized("Invalid authorization header format".into())
            }
            GateRejection::Token(e) => e.into(),
        }
    }
}

/// Pulls the token out of an `Authorization: Bearer <token>` value.
pub fn bearer_token(value: Option<&str>) -> Result<&str, GateRejection> {
    let value = value.ok_or(GateRejection::MissingHeader)?;
    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(GateRejection::MalformedHeader),
    }
}

/// Runs every step of the gate for one request and returns the principal.
pub fn authenticate_request(
    tokens: &TokenService,
    req: &ServiceRequest,
) -> Result<AuthenticatedUser, GateRejection> {
    let header = match req.headers().get(header::AUTHORIZATION) {
        None => None,
        Some(value) => Some(value.to_str().map_err(|_| GateRejection::MalformedHeader)?),
    };
    let token = bearer_token(header)?;
    tokens.authenticate(token).map_err(GateRejection::Token)
}

/// Bearer-token gate. Wrap it around every scope that touches owner data.
#[derive(Clone)]
pub struct AuthMiddleware {
    tokens: Arc<TokenService>,
}

impl AuthMiddleware {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service,
            tokens: Arc::clone(&self.tokens),
        }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
    tokens: Arc<TokenService>,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate_request(&self.tokens, &req) {
            Ok(user) => {
                req.extensions_mut().insert(user);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(rejection) => {
                log::debug!(
                    "Rejected {} {}: {}",
                    req.method(),
                    req.path(),
                    rejection
                );
                // Answer here; the wrapped service never sees the request.
                let response = AppError::from(rejection).error_response();
                Box::pin(ready(Ok(req.into_response(response).map_into_right_body())))
            }
        }
    }
}
