use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use uuid::Uuid;

use crate::services::StoreError;
use crate::utils::{hash_password, verify_password, Password, PasswordHashString};

/// Owner of credential hashes.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Hashes of the account's most recent passwords, newest first, including
    /// the current one.
    async fn password_history(
        &self,
        account_id: Uuid,
        depth: usize,
    ) -> Result<Vec<PasswordHashString>, StoreError>;

    /// Check `password` against the account's current credential.
    async fn verify_password(&self, account_id: Uuid, password: &Password)
        -> Result<bool, StoreError>;

    /// Replace the account's credential. Either fully applied or not at all.
    async fn set_password(&self, account_id: Uuid, password: &Password) -> Result<(), StoreError>;
}

/// In-memory identity store that records how it was called.
pub struct MockIdentityStore {
    /// Per account, newest first. The head is the current credential.
    pub credentials: Mutex<HashMap<Uuid, Vec<PasswordHashString>>>,
    pub set_password_calls: AtomicUsize,
    pub read_calls: AtomicUsize,
    pub fail_writes: AtomicBool,
    pub fail_reads: AtomicBool,
}

impl Default for MockIdentityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockIdentityStore {
    pub fn new() -> Self {
        Self {
            credentials: Mutex::new(HashMap::new()),
            set_password_calls: AtomicUsize::new(0),
            read_calls: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
        }
    }

    /// Seed a credential without counting it as a call.
    pub fn seed_password(&self, account_id: Uuid, password: &str) -> Result<(), StoreError> {
        let hash = hash_password(&Password::new(password.to_string()))
            .map_err(|e| StoreError::Hashing(e.to_string()))?;
        self.credentials
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock identity store mutex poisoned: {}", e))?
            .entry(account_id)
            .or_default()
            .insert(0, hash);
        Ok(())
    }

    pub fn set_password_count(&self) -> usize {
        self.set_password_calls.load(Ordering::SeqCst)
    }

    pub fn read_count(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.set_password_count() + self.read_count()
    }

    fn current_hash(&self, account_id: Uuid) -> Result<Option<PasswordHashString>, StoreError> {
        let current = self
            .credentials
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock identity store mutex poisoned: {}", e))?
            .get(&account_id)
            .and_then(|history| history.first().cloned());
        Ok(current)
    }

    fn check_reads(&self) -> Result<(), StoreError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Internal(anyhow::anyhow!(
                "Simulated identity store read failure"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityStore for MockIdentityStore {
    async fn password_history(
        &self,
        account_id: Uuid,
        depth: usize,
    ) -> Result<Vec<PasswordHashString>, StoreError> {
        self.check_reads()?;
        let history = self
            .credentials
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock identity store mutex poisoned: {}", e))?
            .get(&account_id)
            .map(|h| h.iter().take(depth).cloned().collect())
            .unwrap_or_default();
        Ok(history)
    }

    async fn verify_password(
        &self,
        account_id: Uuid,
        password: &Password,
    ) -> Result<bool, StoreError> {
        self.check_reads()?;
        match self.current_hash(account_id)? {
            Some(hash) => Ok(verify_password(password, &hash).is_ok()),
            None => Ok(false),
        }
    }

    async fn set_password(&self, account_id: Uuid, password: &Password) -> Result<(), StoreError> {
        self.set_password_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Internal(anyhow::anyhow!(
                "Simulated identity store write failure"
            )));
        }

        let hash = hash_password(password).map_err(|e| StoreError::Hashing(e.to_string()))?;
        self.credentials
            .lock()
            .map_err(|e| anyhow::anyhow!("Mock identity store mutex poisoned: {}", e))?
            .entry(account_id)
            .or_default()
            .insert(0, hash);
        Ok(())
    }
}
