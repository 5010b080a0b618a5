use chrono::{DateTime, Utc};
use uuid::Uuid;

/// The authenticated caller, passed explicitly into every operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub principal_id: Uuid,
    /// When the current authentication grant stops being valid.
    pub expires_at: DateTime<Utc>,
}

impl AuthContext {
    pub fn new(principal_id: Uuid, expires_at: DateTime<Utc>) -> Self {
        Self {
            principal_id,
            expires_at,
        }
    }
}

/// Reports session lifetime for an authenticated caller.
pub trait AuthSession: Send + Sync {
    fn remaining_session_seconds(&self, context: &AuthContext) -> i64;
}

/// Remaining lifetime taken from the grant's expiry, never negative.
#[derive(Debug, Clone, Default)]
pub struct TokenExpirySession;

impl AuthSession for TokenExpirySession {
    fn remaining_session_seconds(&self, context: &AuthContext) -> i64 {
        (context.expires_at - Utc::now()).num_seconds().max(0)
    }
}
