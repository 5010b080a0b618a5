//! Test helpers for credential-service integration tests.
//!
//! Wires the real services on top of the in-memory stores.

#![allow(dead_code)]

use chrono::{Duration as ChronoDuration, Utc};
use credential_service::{
    models::{Account, PasswordPolicy},
    services::{
        AccountActivation, AuthContext, AuthSession, CredentialService, DefaultTextService,
        IdentityStore, MockAccountStore, MockIdentityStore, PasswordChanger,
        RandomPasswordGenerator,
    },
};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub const SESSION_SECONDS: i64 = 1200;

/// Session collaborator that always reports the same remaining lifetime.
pub struct FixedSession(pub i64);

impl AuthSession for FixedSession {
    fn remaining_session_seconds(&self, _context: &AuthContext) -> i64 {
        self.0
    }
}

pub struct TestApp {
    pub identity: Arc<MockIdentityStore>,
    pub accounts: Arc<MockAccountStore>,
    pub changer: PasswordChanger,
    pub activation: AccountActivation,
    pub service: CredentialService,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(PasswordPolicy::default())
    }

    pub fn with_policy(policy: PasswordPolicy) -> Self {
        let identity = Arc::new(MockIdentityStore::new());
        Self::with_identity_store(identity.clone(), identity, policy, Duration::from_secs(5))
    }

    /// `identity` is what the services call; `recorder` is kept for assertions.
    pub fn with_identity_store(
        identity: Arc<dyn IdentityStore>,
        recorder: Arc<MockIdentityStore>,
        policy: PasswordPolicy,
        store_timeout: Duration,
    ) -> Self {
        let accounts = Arc::new(MockAccountStore::new());

        let changer = PasswordChanger::new(
            identity,
            Arc::new(RandomPasswordGenerator::default()),
            Arc::new(DefaultTextService),
            policy,
            store_timeout,
        );
        let activation = AccountActivation::new(
            changer.clone(),
            accounts.clone(),
            Arc::new(FixedSession(SESSION_SECONDS)),
            store_timeout,
        );
        let service = CredentialService::new(changer.clone(), activation.clone());

        Self {
            identity: recorder,
            accounts,
            changer,
            activation,
            service,
        }
    }

    /// Insert a pending invited account and return its id.
    pub fn invite(&self, email: &str) -> Uuid {
        let account = Account::new_invited(email.to_string(), Some("Invited Editor".to_string()));
        let account_id = account.account_id;
        self.accounts.insert(account).expect("Failed to insert account");
        account_id
    }

    /// Insert an approved account with a known password.
    pub fn approved_account(&self, email: &str, password: &str) -> Uuid {
        let mut account = Account::new_invited(email.to_string(), None);
        account.approve();
        let account_id = account.account_id;
        self.accounts.insert(account).expect("Failed to insert account");
        self.identity
            .seed_password(account_id, password)
            .expect("Failed to seed password");
        account_id
    }

    pub async fn stored_account(&self, account_id: Uuid) -> Account {
        use credential_service::services::AccountStore;
        self.accounts
            .load(account_id)
            .await
            .expect("Failed to load account")
            .expect("Account missing")
    }
}

pub fn auth_context(principal_id: Uuid) -> AuthContext {
    AuthContext::new(principal_id, Utc::now() + ChronoDuration::minutes(20))
}
