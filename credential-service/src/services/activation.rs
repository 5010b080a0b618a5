//! Invited-account activation.
//!
//! `pending --[activate: success]--> approved`
//! `pending --[activate: failure]--> pending`

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::models::{Account, ActivatedAccountView, PasswordChangeOutcome, PasswordChangeRequest};
use crate::services::policy::{PasswordViolations, PolicyViolation};
use crate::services::{
    AccountStore, AuthContext, AuthSession, CredentialError, PasswordChanger, StoreError,
};
use crate::utils::Password;

#[derive(Clone)]
pub struct AccountActivation {
    changer: PasswordChanger,
    accounts: Arc<dyn AccountStore>,
    session: Arc<dyn AuthSession>,
    store_timeout: Duration,
}

impl AccountActivation {
    pub fn new(
        changer: PasswordChanger,
        accounts: Arc<dyn AccountStore>,
        session: Arc<dyn AuthSession>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            changer,
            accounts,
            session,
            store_timeout,
        }
    }

    /// Set the initial password of the invited account the caller is signed
    /// in as, then approve the account.
    ///
    /// The caller must already be authorized as a pending account; that check
    /// happens before this is reached.
    pub async fn activate_invited_account(
        &self,
        context: &AuthContext,
        new_password: Password,
    ) -> Result<ActivatedAccountView, CredentialError> {
        let account_id = context.principal_id;

        let mut account = match self.call(self.accounts.load(account_id)).await {
            Ok(Some(account)) => account,
            Ok(None) => return Err(CredentialError::AccountNotFound),
            Err(e) => {
                tracing::error!(
                    account_id = %account_id,
                    error = %e,
                    "Failed to load account for activation"
                );
                return Err(PasswordViolations::single(PolicyViolation::StoreFailure).into());
            }
        };

        // 1. Credential first; the account record is untouched if this fails
        let request = PasswordChangeRequest {
            account_id,
            acting_principal: account_id,
            current_password: None,
            new_password: Some(new_password),
            reset: false,
        };
        if let PasswordChangeOutcome::Rejected { violations } =
            self.changer.change_password(request).await
        {
            tracing::info!(
                account_id = %account_id,
                violations = violations.len(),
                "Invited account activation rejected"
            );
            return Err(CredentialError::Validation(violations));
        }

        // 2. Approve. A failure here leaves the password changed but the
        // account pending; it is reported, not retried.
        let newly_approved = account.approve();
        if let Err(e) = self.call(self.accounts.save(&account)).await {
            tracing::error!(
                account_id = %account_id,
                error = %e,
                "Password set but approval not persisted; reconcile_approval required"
            );
            return Err(CredentialError::InconsistentActivation { account_id });
        }

        tracing::info!(
            account_id = %account_id,
            newly_approved,
            "Invited account activated"
        );

        // 3. Full view for the now fully signed-in account
        let seconds_until_timeout = self.session.remaining_session_seconds(context);
        Ok(ActivatedAccountView::new(&account, seconds_until_timeout))
    }

    /// Re-apply only the approval flag after an `InconsistentActivation`.
    /// The credential is left alone.
    pub async fn reconcile_approval(&self, account_id: Uuid) -> Result<Account, CredentialError> {
        let mut account = self
            .call(self.accounts.load(account_id))
            .await?
            .ok_or(CredentialError::AccountNotFound)?;

        if account.approve() {
            self.call(self.accounts.save(&account)).await?;
            tracing::info!(account_id = %account_id, "Account approval reconciled");
        } else {
            tracing::debug!(account_id = %account_id, "Account already approved");
        }

        Ok(account)
    }

    async fn call<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| StoreError::Timeout)?
    }
}
