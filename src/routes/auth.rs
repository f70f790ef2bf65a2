use crate::{
    auth::{AuthResponse, AuthenticatedUser, LoginRequest, RegisterRequest},
    error::AppError,
    state::AppState,
    store::StoreError,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

fn bad_credentials() -> AppError {
    AppError::Unauthorized("Invalid email or password".into())
}

/// Register a new user
///
/// Hashes the password and stores the account. Uniqueness of the email is left to
/// the store, so two racing registrations cannot both succeed.
///
/// ## Responses:
/// - `201 Created`: the new `User` (the password hash is never serialized).
/// - `400 Bad Request`: invalid email, password shorter than 6 characters, or an
///   email that is already registered.
/// - `500 Internal Server Error`: hashing or storage failure.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest { email, password } = register_data.into_inner();

    let hasher = state.passwords;
    let password_hash = web::block(move || hasher.hash(&password)).await??;

    let user = state.users.create_user(&email, &password_hash).await?;
    log::info!("Registered user {}", user.id);

    Ok(HttpResponse::Created().json(user))
}

/// Login user
///
/// Verifies the credentials and returns a signed access token. Unknown email and
/// wrong password produce the same 401.
///
/// ## Responses:
/// - `200 OK`: an `AuthResponse` with the token and user id.
/// - `401 Unauthorized`: bad credentials.
/// - `500 Internal Server Error`: storage, hashing or signing failure.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let LoginRequest { email, password } = login_data.into_inner();

    let user = match state.users.get_user_by_email(&email).await {
        Ok(user) => Some(user),
        Err(StoreError::NotFound) => None,
        Err(e) => return Err(e.into()),
    };

    // Unknown emails still cost one bcrypt round.
    let hasher = state.passwords;
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let matches = web::block(move || match stored_hash {
        Some(hash) => hasher.verify(&password, &hash),
        None => hasher.verify_missing(&password),
    })
    .await??;

    let user = match user {
        Some(user) if matches => user,
        _ => return Err(bad_credentials()),
    };

    let token = state.tokens.issue(&user)?;
    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        user_id: user.id,
    }))
}

/// The account behind the presented token.
pub async fn me(
    state: web::Data<AppState>,
    principal: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let user = state.users.get_user_by_id(principal.user_id()).await?;
    Ok(HttpResponse::Ok().json(user))
}
