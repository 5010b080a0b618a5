//! Password policy evaluation.
//!
//! Validates a requested password against the configured policy and the
//! account's password history. Every failed rule is reported, not just the
//! first one, so the caller can show them all at once.

use thiserror::Error;
use uuid::Uuid;

use crate::models::PasswordPolicy;
use crate::utils::{verify_password, Password, PasswordHashString};

/// Characters accepted as "special" by the policy and used by the generator.
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*()-_=+[]{}|\\;:'\",.<>/?`~";

/// A single rule failure, safe to show to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("A new password is required")]
    PasswordRequired,

    #[error("The current password is required")]
    CurrentPasswordRequired,

    #[error("The current password is incorrect")]
    IncorrectCurrentPassword,

    #[error("Password must be at least {min_length} characters (got {actual_length})")]
    PasswordTooShort {
        min_length: usize,
        actual_length: usize,
    },

    #[error("Password must be at most {max_length} characters")]
    PasswordTooLong { max_length: usize },

    #[error("Password must contain at least one uppercase letter")]
    PasswordMissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    PasswordMissingLowercase,

    #[error("Password must contain at least one number")]
    PasswordMissingNumber,

    #[error("Password must contain at least one special character")]
    PasswordMissingSpecial,

    #[error("Password must not match any of the last {history_depth} passwords")]
    PasswordReused { history_depth: usize },

    /// A backing store failed. The underlying error is only logged.
    #[error("The password could not be changed, please try again later")]
    StoreFailure,
}

impl PolicyViolation {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PolicyViolation::PasswordRequired => "password_required",
            PolicyViolation::CurrentPasswordRequired => "current_password_required",
            PolicyViolation::IncorrectCurrentPassword => "incorrect_current_password",
            PolicyViolation::PasswordTooShort { .. } => "password_too_short",
            PolicyViolation::PasswordTooLong { .. } => "password_too_long",
            PolicyViolation::PasswordMissingUppercase => "password_missing_uppercase",
            PolicyViolation::PasswordMissingLowercase => "password_missing_lowercase",
            PolicyViolation::PasswordMissingNumber => "password_missing_number",
            PolicyViolation::PasswordMissingSpecial => "password_missing_special",
            PolicyViolation::PasswordReused { .. } => "password_reused",
            PolicyViolation::StoreFailure => "store_failure",
        }
    }
}

/// Non-empty list of violations, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_messages(.0))]
pub struct PasswordViolations(Vec<PolicyViolation>);

fn join_messages(violations: &[PolicyViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl PasswordViolations {
    /// Returns `None` for an empty list.
    pub fn new(violations: Vec<PolicyViolation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self(violations))
        }
    }

    pub fn single(violation: PolicyViolation) -> Self {
        Self(vec![violation])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[PolicyViolation] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<PolicyViolation> {
        self.0
    }

    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

/// Where the candidate password came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordOrigin {
    /// Typed in by a user.
    Supplied,
    /// Produced by the trusted generator in reset mode.
    Generated,
}

/// What the evaluator knows about the account whose password is changing.
#[derive(Debug, Clone)]
pub struct CredentialContext {
    pub account_id: Uuid,
    pub origin: PasswordOrigin,
    /// Hashes of previous passwords, newest first. Empty when history is not
    /// tracked or not loaded yet.
    pub previous_hashes: Vec<PasswordHashString>,
}

impl CredentialContext {
    pub fn new(account_id: Uuid, origin: PasswordOrigin) -> Self {
        Self {
            account_id,
            origin,
            previous_hashes: Vec::new(),
        }
    }

    pub fn with_history(mut self, previous_hashes: Vec<PasswordHashString>) -> Self {
        self.previous_hashes = previous_hashes;
        self
    }
}

/// Password policy evaluation service. Pure: no I/O, no side effects.
#[derive(Debug, Clone)]
pub struct PolicyService;

impl PolicyService {
    /// Evaluate a candidate password.
    ///
    /// Generated passwords satisfy the policy by construction and are accepted
    /// without running the rules.
    pub fn evaluate(
        context: &CredentialContext,
        password: &Password,
        policy: &PasswordPolicy,
    ) -> Result<(), PasswordViolations> {
        if context.origin == PasswordOrigin::Generated {
            return Ok(());
        }

        let mut errors = Self::complexity_violations(password, policy);

        if Self::matches_history(password, &context.previous_hashes, policy.history_depth) {
            errors.push(PolicyViolation::PasswordReused {
                history_depth: policy.history_depth,
            });
        }

        match PasswordViolations::new(errors) {
            Some(violations) => Err(violations),
            None => Ok(()),
        }
    }

    /// Length and character-class rules only.
    pub fn complexity_violations(
        password: &Password,
        policy: &PasswordPolicy,
    ) -> Vec<PolicyViolation> {
        let mut errors = Vec::new();
        let value = password.as_str();
        let length = password.char_count();

        if length < policy.min_length {
            errors.push(PolicyViolation::PasswordTooShort {
                min_length: policy.min_length,
                actual_length: length,
            });
        }

        if length > policy.max_length {
            errors.push(PolicyViolation::PasswordTooLong {
                max_length: policy.max_length,
            });
        }

        if policy.require_uppercase && !value.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(PolicyViolation::PasswordMissingUppercase);
        }

        if policy.require_lowercase && !value.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push(PolicyViolation::PasswordMissingLowercase);
        }

        if policy.require_number && !value.chars().any(|c| c.is_ascii_digit()) {
            errors.push(PolicyViolation::PasswordMissingNumber);
        }

        if policy.require_special && !value.chars().any(is_special) {
            errors.push(PolicyViolation::PasswordMissingSpecial);
        }

        errors
    }

    fn matches_history(
        password: &Password,
        previous_hashes: &[PasswordHashString],
        history_depth: usize,
    ) -> bool {
        previous_hashes
            .iter()
            .take(history_depth)
            .any(|hash| verify_password(password, hash).is_ok())
    }
}

pub fn is_special(c: char) -> bool {
    SPECIAL_CHARACTERS.contains(c)
}
