//! Entry points offered to callers of the credential core.

use secrecy::SecretString;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::CredentialConfig;
use crate::models::{
    Account, ActivatedAccountView, PasswordChangeOutcome, PasswordChangeRequest,
    WithNotifications,
};
use crate::services::policy::{PasswordViolations, PolicyViolation};
use crate::services::{
    AccountActivation, AccountStore, AuthContext, AuthSession, CredentialError, DefaultTextService,
    IdentityStore, PasswordChanger, RandomPasswordGenerator,
};
use crate::utils::Password;

/// Input for [`CredentialService::change_password`].
#[derive(Debug, Default)]
pub struct ChangePasswordInput {
    /// Target account; the caller's own account when `None`.
    pub account_id: Option<Uuid>,
    pub current_password: Option<Password>,
    pub new_password: Option<Password>,
    pub reset: bool,
}

#[derive(Clone)]
pub struct CredentialService {
    changer: PasswordChanger,
    activation: AccountActivation,
}

impl CredentialService {
    pub fn new(changer: PasswordChanger, activation: AccountActivation) -> Self {
        Self {
            changer,
            activation,
        }
    }

    /// Wire the service from configuration and the external collaborators.
    pub fn from_config(
        config: &CredentialConfig,
        identity: Arc<dyn IdentityStore>,
        accounts: Arc<dyn AccountStore>,
        session: Arc<dyn AuthSession>,
    ) -> Self {
        let changer = PasswordChanger::new(
            identity,
            Arc::new(RandomPasswordGenerator::new(config.generated_password_length)),
            Arc::new(DefaultTextService),
            config.password_policy.clone(),
            config.store_timeout(),
        );
        let activation =
            AccountActivation::new(changer.clone(), accounts, session, config.store_timeout());
        Self::new(changer, activation)
    }

    /// Invited account sets its first password and becomes approved.
    pub async fn set_invited_user_password(
        &self,
        context: &AuthContext,
        new_password: Password,
    ) -> Result<ActivatedAccountView, CredentialError> {
        self.activation
            .activate_invited_account(context, new_password)
            .await
    }

    /// Change a password, or reset it when `input.reset` is set.
    ///
    /// On success the value is the generated password for a reset and `None`
    /// otherwise.
    pub async fn change_password(
        &self,
        context: &AuthContext,
        input: ChangePasswordInput,
    ) -> Result<WithNotifications<Option<SecretString>>, CredentialError> {
        let account_id = input.account_id.unwrap_or(context.principal_id);

        let mut violations = Vec::new();
        if !input.reset {
            if input.new_password.is_none() {
                violations.push(PolicyViolation::PasswordRequired);
            }
            if account_id == context.principal_id && input.current_password.is_none() {
                violations.push(PolicyViolation::CurrentPasswordRequired);
            }
        }
        if let Some(violations) = PasswordViolations::new(violations) {
            return Err(CredentialError::Validation(violations));
        }

        let request = PasswordChangeRequest {
            account_id,
            acting_principal: context.principal_id,
            current_password: input.current_password,
            new_password: input.new_password,
            reset: input.reset,
        };

        match self.changer.change_password(request).await {
            PasswordChangeOutcome::Changed {
                generated_password,
                notifications,
            } => Ok(WithNotifications::with_notifications(
                generated_password,
                notifications,
            )),
            PasswordChangeOutcome::Rejected { violations } => {
                Err(CredentialError::Validation(violations))
            }
        }
    }

    /// Follow-up for [`CredentialError::InconsistentActivation`].
    pub async fn reconcile_approval(&self, account_id: Uuid) -> Result<Account, CredentialError> {
        self.activation.reconcile_approval(account_id).await
    }
}
