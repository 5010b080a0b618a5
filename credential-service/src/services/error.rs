use service_core::error::AppError;
use thiserror::Error;
use uuid::Uuid;

use crate::services::policy::PasswordViolations;

/// Failure reported by a backing store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Store call timed out")]
    Timeout,

    #[error("Account not found")]
    AccountNotFound,

    #[error("Password hashing error: {0}")]
    Hashing(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Error returned by the credential entry points.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("{0}")]
    Validation(#[from] PasswordViolations),

    #[error("Account not found")]
    AccountNotFound,

    /// The password was changed but the approval flag could not be saved.
    /// Needs `reconcile_approval`, not a second activation.
    #[error("Password set but approval not persisted for account {account_id}")]
    InconsistentActivation { account_id: Uuid },

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for CredentialError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AccountNotFound => CredentialError::AccountNotFound,
            other => CredentialError::Store(other),
        }
    }
}

impl CredentialError {
    /// Violations to show the caller, if this is a validation failure.
    pub fn violations(&self) -> Option<&PasswordViolations> {
        match self {
            CredentialError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Validation(v) => AppError::ValidationError(v.messages()),
            CredentialError::AccountNotFound => {
                AppError::NotFound(anyhow::anyhow!("Account not found"))
            }
            CredentialError::InconsistentActivation { account_id } => AppError::InternalError(
                anyhow::anyhow!("Approval not persisted for account {}", account_id),
            ),
            CredentialError::Store(e) => AppError::DatabaseError(anyhow::anyhow!(e)),
        }
    }
}
