//! Per-session actor context.
//!
//! Every operation that records an actor takes one of these explicitly.
//! There is no ambient "current user" anywhere in the workspace.

use serde::{Deserialize, Serialize};

/// Access role of an authenticated session.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Approves/rejects batches, manages the master catalog, resets movement data.
    Admin,
    /// Submits movement requests and reads reports.
    User,
}

impl Role {
    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl core::str::FromStr for Role {
    type Err = crate::StockError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(crate::StockError::validation(format!(
                "unknown role: {other}"
            ))),
        }
    }
}

/// Identity attached to each command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    username: String,
    role: Role,
}

impl SessionContext {
    pub fn new(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn require_admin(&self) -> crate::StockResult<()> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(crate::StockError::Unauthorized)
        }
    }
}
