//! Password change orchestration.
//!
//! Self-service changes and administrator resets go through the same path;
//! `reset` is the only thing that tells them apart, so the policy is applied
//! the same way to both.

use secrecy::ExposeSecret;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::models::{Notification, PasswordChangeOutcome, PasswordChangeRequest, PasswordPolicy};
use crate::services::policy::{
    CredentialContext, PasswordOrigin, PasswordViolations, PolicyService, PolicyViolation,
};
use crate::services::{IdentityStore, PasswordGenerator, StoreError, TextService};
use crate::utils::Password;

#[derive(Clone)]
pub struct PasswordChanger {
    identity: Arc<dyn IdentityStore>,
    generator: Arc<dyn PasswordGenerator>,
    text: Arc<dyn TextService>,
    policy: PasswordPolicy,
    store_timeout: Duration,
}

impl PasswordChanger {
    pub fn new(
        identity: Arc<dyn IdentityStore>,
        generator: Arc<dyn PasswordGenerator>,
        text: Arc<dyn TextService>,
        policy: PasswordPolicy,
        store_timeout: Duration,
    ) -> Self {
        Self {
            identity,
            generator,
            text,
            policy,
            store_timeout,
        }
    }

    pub fn policy(&self) -> &PasswordPolicy {
        &self.policy
    }

    /// Change the password described by `request`.
    ///
    /// Never fails with an error: policy violations and store failures both
    /// come back as a rejected outcome. The identity store is only written
    /// once every check has passed.
    pub async fn change_password(&self, request: PasswordChangeRequest) -> PasswordChangeOutcome {
        let PasswordChangeRequest {
            account_id,
            acting_principal,
            current_password,
            new_password,
            reset,
        } = request;

        // 1. Pick the candidate password
        let (password, origin, generated_password) = if reset {
            let generated = self.generator.generate(&self.policy);
            let password = Password::new(generated.expose_secret().clone());
            (password, PasswordOrigin::Generated, Some(generated))
        } else {
            match new_password {
                Some(password) => (password, PasswordOrigin::Supplied, None),
                None => {
                    return PasswordChangeOutcome::rejected(PasswordViolations::single(
                        PolicyViolation::PasswordRequired,
                    ))
                }
            }
        };

        // 2. Policy, without touching any store while the password is plainly invalid
        let context = CredentialContext::new(account_id, origin);
        if let Err(violations) = PolicyService::evaluate(&context, &password, &self.policy) {
            tracing::info!(
                account_id = %account_id,
                violations = violations.len(),
                "Password change rejected by policy"
            );
            return PasswordChangeOutcome::rejected(violations);
        }

        // 3. Prove knowledge of the current password before anything about
        // the account's history is reported back
        if !reset {
            if let Some(current) = current_password {
                match self
                    .call(self.identity.verify_password(account_id, &current))
                    .await
                {
                    Ok(true) => {}
                    Ok(false) => {
                        tracing::info!(
                            account_id = %account_id,
                            "Password change rejected: current password mismatch"
                        );
                        return PasswordChangeOutcome::rejected(PasswordViolations::single(
                            PolicyViolation::IncorrectCurrentPassword,
                        ));
                    }
                    Err(e) => return self.store_failure(account_id, e),
                }
            }
        }

        // 4. Reuse check; argon2 verification runs on the blocking pool
        if origin == PasswordOrigin::Supplied && self.policy.tracks_history() {
            let history = match self
                .call(
                    self.identity
                        .password_history(account_id, self.policy.history_depth),
                )
                .await
            {
                Ok(history) => history,
                Err(e) => return self.store_failure(account_id, e),
            };

            let context = context.with_history(history);
            let candidate = Password::new(password.as_str().to_string());
            let policy = self.policy.clone();
            let evaluation = tokio::task::spawn_blocking(move || {
                PolicyService::evaluate(&context, &candidate, &policy)
            })
            .await;

            match evaluation {
                Ok(Ok(())) => {}
                Ok(Err(violations)) => {
                    tracing::info!(
                        account_id = %account_id,
                        violations = violations.len(),
                        "Password change rejected by password history"
                    );
                    return PasswordChangeOutcome::rejected(violations);
                }
                Err(e) => {
                    return self.store_failure(
                        account_id,
                        StoreError::Internal(anyhow::anyhow!("History check task failed: {}", e)),
                    )
                }
            }
        }

        // 5. Write the credential
        if let Err(e) = self
            .call(self.identity.set_password(account_id, &password))
            .await
        {
            return self.store_failure(account_id, e);
        }

        tracing::info!(
            account_id = %account_id,
            acting_principal = %acting_principal,
            reset,
            "Password changed"
        );

        // 6. Success, with the generated password handed back exactly once
        let message_key = if reset {
            "user/passwordReset"
        } else {
            "user/passwordChanged"
        };
        let notification = Notification::success(
            self.text.localize("user/password"),
            self.text.localize(message_key),
        );

        PasswordChangeOutcome::Changed {
            generated_password,
            notifications: vec![notification],
        }
    }

    async fn call<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| StoreError::Timeout)?
    }

    fn store_failure(&self, account_id: Uuid, error: StoreError) -> PasswordChangeOutcome {
        tracing::error!(
            account_id = %account_id,
            error = %error,
            "Identity store failure during password change"
        );
        PasswordChangeOutcome::rejected(PasswordViolations::single(PolicyViolation::StoreFailure))
    }
}
