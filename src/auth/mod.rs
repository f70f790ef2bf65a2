pub mod extractors;
pub mod middleware;
pub mod password;
pub mod token;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::UserId;

pub use extractors::AuthenticatedUser;
pub use middleware::AuthMiddleware;
pub use password::{HashingError, PasswordHasher};
pub use token::{Claims, TokenError, TokenService};

/// Represents the payload for a user login request.
///
/// Not validated. Any mismatch, malformed input included, is reported as bad
/// credentials.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address for the new account. Stored exactly as given.
    #[validate(email)]
    pub email: String,
    /// Password for the new account.
    /// Between 6 and 72 characters; bcrypt ignores anything past 72 bytes.
    #[validate(length(min = 6, max = 72))]
    pub password: String,
}

/// Response structure after a successful login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    /// The signed access token to send as `Authorization: Bearer <token>`.
    pub token: String,
    /// The unique identifier of the authenticated user.
    pub user_id: UserId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid_email = RegisterRequest {
            email: "aliceexample.com".to_string(),
            password: "secret1".to_string(),
        };
        assert!(invalid_email.validate().is_err());

        let short_password = RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "12345".to_string(),
        };
        assert!(short_password.validate().is_err());

        let long_password = RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "p".repeat(73),
        };
        assert!(long_password.validate().is_err());
    }
}
