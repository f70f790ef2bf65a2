use bcrypt::{hash, verify};
use std::fmt;

/// Hashing or verification could not be carried out. Always a server error.
#[derive(Debug)]
pub struct HashingError(pub String);

impl fmt::Display for HashingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "password hashing failed: {}", self.0)
    }
}

impl std::error::Error for HashingError {}

/// bcrypt with a process-wide cost. Each hash embeds its own random salt and
/// `verify` compares in constant time.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash(&self, password: &str) -> Result<String, HashingError> {
        hash(password, self.cost).map_err(|e| HashingError(e.to_string()))
    }

    /// `Ok(false)` for a wrong password; `Err` only when the stored hash is unusable.
    pub fn verify(&self, password: &str, hashed_password: &str) -> Result<bool, HashingError> {
        verify(password, hashed_password).map_err(|e| HashingError(e.to_string()))
    }

    /// Stand-in for `verify` when no account matches. Spends one bcrypt round at the
    /// configured cost, then reports a mismatch.
    pub fn verify_missing(&self, password: &str) -> Result<bool, HashingError> {
        self.hash(password).map(|_| false)
    }
}
