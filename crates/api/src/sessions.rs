//! Opaque login sessions.
//!
//! A successful login issues a random token; the registry resolves it back
//! to the explicit [`SessionContext`] every handler receives. Tokens live in
//! process memory: a restart logs everyone out, which matches how the
//! operators actually run this system.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use gudang_core::SessionContext;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionContext>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token for an authenticated session.
    pub fn issue(&self, context: SessionContext) -> String {
        let token = Uuid::now_v7().simple().to_string();
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(token.clone(), context);
        }
        token
    }

    pub fn resolve(&self, token: &str) -> Option<SessionContext> {
        self.sessions.read().ok()?.get(token).cloned()
    }

    /// Returns whether the token existed.
    pub fn revoke(&self, token: &str) -> bool {
        match self.sessions.write() {
            Ok(mut sessions) => sessions.remove(token).is_some(),
            Err(_) => false,
        }
    }
}
