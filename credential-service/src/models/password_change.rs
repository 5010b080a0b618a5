//! Password change request and outcome.

use secrecy::SecretString;
use uuid::Uuid;

use crate::models::Notification;
use crate::services::{PasswordViolations, PolicyViolation};
use crate::utils::Password;

/// A request to change the password of `account_id`.
///
/// In reset mode the new password is generated by the service and any
/// supplied `new_password` is ignored.
#[derive(Debug)]
pub struct PasswordChangeRequest {
    pub account_id: Uuid,
    pub acting_principal: Uuid,
    pub current_password: Option<Password>,
    pub new_password: Option<Password>,
    pub reset: bool,
}

impl PasswordChangeRequest {
    /// The account owner changes their own password.
    pub fn self_service(
        account_id: Uuid,
        current_password: Option<Password>,
        new_password: Password,
    ) -> Self {
        Self {
            account_id,
            acting_principal: account_id,
            current_password,
            new_password: Some(new_password),
            reset: false,
        }
    }

    /// An administrator forces a generated password onto `account_id`.
    pub fn admin_reset(acting_principal: Uuid, account_id: Uuid) -> Self {
        Self {
            account_id,
            acting_principal,
            current_password: None,
            new_password: None,
            reset: true,
        }
    }
}

/// Result of a password change. Either the change went through, or it was
/// rejected with at least one violation; never both.
#[derive(Debug)]
pub enum PasswordChangeOutcome {
    Changed {
        /// Only set in reset mode, so a self-service password is never echoed back.
        generated_password: Option<SecretString>,
        notifications: Vec<Notification>,
    },
    Rejected { violations: PasswordViolations },
}

impl PasswordChangeOutcome {
    pub(crate) fn rejected(violations: PasswordViolations) -> Self {
        PasswordChangeOutcome::Rejected { violations }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PasswordChangeOutcome::Changed { .. })
    }

    pub fn violations(&self) -> &[PolicyViolation] {
        match self {
            PasswordChangeOutcome::Rejected { violations } => violations.as_slice(),
            PasswordChangeOutcome::Changed { .. } => &[],
        }
    }

    pub fn generated_password(&self) -> Option<&SecretString> {
        match self {
            PasswordChangeOutcome::Changed {
                generated_password, ..
            } => generated_password.as_ref(),
            PasswordChangeOutcome::Rejected { .. } => None,
        }
    }

    pub fn notifications(&self) -> &[Notification] {
        match self {
            PasswordChangeOutcome::Changed { notifications, .. } => notifications,
            PasswordChangeOutcome::Rejected { .. } => &[],
        }
    }
}
