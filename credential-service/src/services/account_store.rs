use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::models::Account;
use crate::services::StoreError;

/// Persistence for account attributes (approval flag, profile).
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn load(&self, account_id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Last write wins.
    async fn save(&self, account: &Account) -> Result<(), StoreError>;
}

/// In-memory account store with failure injection.
pub struct MockAccountStore {
    pub accounts: Mutex<HashMap<Uuid, Account>>,
    pub save_calls: AtomicUsize,
    pub fail_saves: AtomicBool,
}

impl Default for MockAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAccountStore {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            save_calls: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
        }
    }

    pub fn insert(&self, account: Account) -> Result<(), StoreError> {
        self.accounts
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock account store mutex poisoned: {}", e))?
            .insert(account.account_id, account);
        Ok(())
    }

    pub fn save_count(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AccountStore for MockAccountStore {
    async fn load(&self, account_id: Uuid) -> Result<Option<Account>, StoreError> {
        let account = self
            .accounts
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock account store mutex poisoned: {}", e))?
            .get(&account_id)
            .cloned();
        Ok(account)
    }

    async fn save(&self, account: &Account) -> Result<(), StoreError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Internal(anyhow::anyhow!(
                "Simulated account store write failure"
            )));
        }
        self.insert(account.clone())
    }
}
