//! Account model - back-office user accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account state derived from the approval flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountState {
    /// Invited and partially authenticated, no password of their own yet.
    Pending,
    Approved,
}

/// Account entity.
///
/// The credential itself lives in the identity store and is never carried here.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Account {
    pub account_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub locale: Option<String>,
    pub is_approved: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl Account {
    /// Create a new invited (pending) account.
    pub fn new_invited(email: String, display_name: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            account_id: Uuid::new_v4(),
            email,
            display_name,
            locale: None,
            is_approved: false,
            created_utc: now,
            updated_utc: now,
        }
    }

    pub fn state(&self) -> AccountState {
        if self.is_approved {
            AccountState::Approved
        } else {
            AccountState::Pending
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.is_approved
    }

    /// Mark the account approved. Approval never reverts, so calling this on an
    /// approved account is a no-op. Returns whether the flag changed.
    pub fn approve(&mut self) -> bool {
        if self.is_approved {
            return false;
        }
        self.is_approved = true;
        self.updated_utc = Utc::now();
        true
    }
}

/// Profile projection returned once an invited account is fully signed in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivatedAccountView {
    pub account_id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub locale: Option<String>,
    pub state: AccountState,
    pub seconds_until_timeout: i64,
}

impl ActivatedAccountView {
    pub fn new(account: &Account, seconds_until_timeout: i64) -> Self {
        Self {
            account_id: account.account_id,
            email: account.email.clone(),
            display_name: account.display_name.clone(),
            locale: account.locale.clone(),
            state: account.state(),
            seconds_until_timeout,
        }
    }
}
