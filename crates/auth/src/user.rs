//! User records for the login gate.
//!
//! Users are operator-provisioned rows in the users table. There is no
//! self-service signup, password reset, or user lifecycle beyond what the
//! operator inserts.

use serde::{Deserialize, Serialize};

use gudang_core::{Role, SessionContext, StockError, StockResult};

/// One provisioned user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    pub role: Role,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            role,
        }
    }

    /// Check a login attempt against the stored credential.
    ///
    /// Credentials are stored as provisioned by the operator.
    /// TODO: hash passwords once operator tooling can re-provision credentials.
    pub fn verify(&self, candidate: &str) -> bool {
        // Length check first so the comparison below never short-circuits on
        // a prefix match alone.
        self.password.len() == candidate.len()
            && self
                .password
                .bytes()
                .zip(candidate.bytes())
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }

    /// Build the session context a successful login produces.
    pub fn session(&self) -> SessionContext {
        SessionContext::new(self.username.clone(), self.role)
    }
}

/// Verify a username/password pair against a user lookup result.
///
/// A missing user and a wrong password produce the same error so the login
/// boundary does not leak which usernames exist.
pub fn authenticate(user: Option<User>, password: &str) -> StockResult<SessionContext> {
    match user {
        Some(u) if u.verify(password) => Ok(u.session()),
        _ => Err(StockError::validation("invalid username or password")),
    }
}
