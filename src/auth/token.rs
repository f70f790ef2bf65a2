use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use super::extractors::AuthenticatedUser;
use crate::models::{User, UserId};

/// Default lifetime of an access token.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// The single algorithm tokens are signed and accepted with.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// Represents the claims encoded within an access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the user's id.
    pub sub: UserId,
    /// Email of the user at issue time. Informational only.
    #[serde(default)]
    pub email: String,
    /// Issued-at timestamp (seconds since epoch). Informational only.
    #[serde(default)]
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
}

/// Why a token was refused. All verification kinds look the same to the client;
/// the distinction is kept for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The signature does not match the server secret.
    InvalidSignature,
    /// The header names an algorithm other than [`TOKEN_ALGORITHM`], `none` included.
    AlgorithmMismatch,
    /// The current time is at or past `exp`.
    Expired,
    /// The payload is signed correctly but `sub` is missing or not an integer.
    MalformedClaims,
    /// The input is not a structurally valid JWT.
    MalformedToken,
    /// Encoding a new token failed.
    Signing(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenError::InvalidSignature => write!(f, "invalid token signature"),
            TokenError::AlgorithmMismatch => write!(f, "unexpected token algorithm"),
            TokenError::Expired => write!(f, "token expired"),
            TokenError::MalformedClaims => write!(f, "malformed token claims"),
            TokenError::MalformedToken => write!(f, "malformed token"),
            TokenError::Signing(msg) => write!(f, "failed to sign token: {}", msg),
        }
    }
}

impl std::error::Error for TokenError {}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Reads `alg` straight from the first segment, so algorithms jsonwebtoken cannot
/// even represent (such as `none`) are still reported as a mismatch.
fn header_algorithm(token: &str) -> Result<String, TokenError> {
    let segment = token
        .split('.')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(TokenError::MalformedToken)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| TokenError::MalformedToken)?;
    let header: RawHeader =
        serde_json::from_slice(&bytes).map_err(|_| TokenError::MalformedToken)?;
    Ok(header.alg)
}

/// Issues and verifies access tokens with a secret fixed at startup.
///
/// Built once from configuration and shared read-only; nothing here consults the
/// environment at call time.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(TOKEN_ALGORITHM);
        validation.leeway = 0;
        // An integer `sub` does not count as present for jsonwebtoken, so its shape
        // is checked by deserializing `Claims` instead.
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
        }
    }

    /// Signs a token for `user` that expires one TTL from now.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            iat: now,
            exp: now.saturating_add(self.ttl_secs),
        };

        encode(&Header::new(TOKEN_ALGORITHM), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Checks algorithm, signature, claim shape and expiry, returning the subject.
    pub fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        let alg = header_algorithm(token)?;
        if alg != "HS256" {
            return Err(TokenError::AlgorithmMismatch);
        }

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::InvalidAlgorithm => TokenError::AlgorithmMismatch,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::MissingRequiredClaim(_) | ErrorKind::Json(_) => {
                    TokenError::MalformedClaims
                }
                _ => TokenError::MalformedToken,
            }
        })?;

        // jsonwebtoken accepts exp == now; a token is dead from its expiry instant on.
        if Utc::now().timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims.sub)
    }

    /// Verifies `token` and wraps the subject as the request principal.
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, TokenError> {
        self.verify(token).map(AuthenticatedUser::new)
    }
}
