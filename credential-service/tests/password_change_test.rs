mod common;

use async_trait::async_trait;
use common::TestApp;
use credential_service::{
    models::{NotificationSeverity, PasswordChangeRequest, PasswordPolicy},
    services::{
        policy::{CredentialContext, PasswordOrigin},
        IdentityStore, MockIdentityStore, PolicyService, PolicyViolation, StoreError,
    },
    utils::{Password, PasswordHashString},
};
use secrecy::ExposeSecret;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

fn pw(value: &str) -> Password {
    Password::new(value.to_string())
}

#[tokio::test]
async fn test_weak_passwords_never_reach_identity_store() {
    let app = TestApp::new();
    let account_id = app.approved_account("editor@example.com", "Str0ngPass!");
    let calls_before = app.identity.total_calls();

    for weak in ["abc", "alllowercase1", "NoDigitsHere", "Sh0rt", ""] {
        let outcome = app
            .changer
            .change_password(PasswordChangeRequest::self_service(account_id, None, pw(weak)))
            .await;

        assert!(!outcome.is_success(), "{weak:?} should be rejected");
        assert!(!outcome.violations().is_empty());
        assert!(outcome.notifications().is_empty());
    }

    assert_eq!(app.identity.total_calls(), calls_before);
}

#[tokio::test]
async fn test_all_violations_reported_together() {
    let app = TestApp::new();
    let outcome = app
        .changer
        .change_password(PasswordChangeRequest::self_service(
            Uuid::new_v4(),
            None,
            pw("abc"),
        ))
        .await;

    // Too short, no uppercase, no number
    assert_eq!(outcome.violations().len(), 3);
}

#[tokio::test]
async fn test_self_service_change_succeeds_without_echoing_password() {
    let app = TestApp::new();
    let account_id = app.approved_account("editor@example.com", "Str0ngPass!");

    let outcome = app
        .changer
        .change_password(PasswordChangeRequest::self_service(
            account_id,
            Some(pw("Str0ngPass!")),
            pw("N3wPassword!"),
        ))
        .await;

    assert!(outcome.is_success());
    assert!(outcome.generated_password().is_none());
    assert!(!outcome.notifications().is_empty());
    assert_eq!(
        outcome.notifications()[0].severity,
        NotificationSeverity::Success
    );
    assert!(!outcome.notifications()[0].header.is_empty());
    assert!(!outcome.notifications()[0].message.is_empty());
    assert_eq!(app.identity.set_password_count(), 1);
    assert!(app
        .identity
        .verify_password(account_id, &pw("N3wPassword!"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_admin_reset_returns_generated_password_that_passes_policy() {
    let app = TestApp::new();
    let admin_id = Uuid::new_v4();
    let account_id = app.approved_account("editor@example.com", "Str0ngPass!");

    let outcome = app
        .changer
        .change_password(PasswordChangeRequest::admin_reset(admin_id, account_id))
        .await;

    assert!(outcome.is_success());
    let generated = outcome
        .generated_password()
        .expect("reset should return the generated password")
        .expose_secret()
        .clone();
    assert!(!generated.is_empty());

    let context = CredentialContext::new(account_id, PasswordOrigin::Supplied);
    assert!(PolicyService::evaluate(&context, &pw(&generated), app.changer.policy()).is_ok());

    // The generated password is now the account's credential
    assert!(app
        .identity
        .verify_password(account_id, &pw(&generated))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_reset_ignores_supplied_password() {
    let app = TestApp::new();
    let account_id = app.approved_account("editor@example.com", "Str0ngPass!");

    let mut request = PasswordChangeRequest::admin_reset(Uuid::new_v4(), account_id);
    request.new_password = Some(pw("abc"));

    let outcome = app.changer.change_password(request).await;

    assert!(outcome.is_success());
    assert!(!app
        .identity
        .verify_password(account_id, &pw("abc"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_missing_password_without_reset_is_rejected() {
    let app = TestApp::new();
    let account_id = Uuid::new_v4();

    let outcome = app
        .changer
        .change_password(PasswordChangeRequest {
            account_id,
            acting_principal: account_id,
            current_password: None,
            new_password: None,
            reset: false,
        })
        .await;

    assert_eq!(outcome.violations(), &[PolicyViolation::PasswordRequired]);
    assert_eq!(app.identity.total_calls(), 0);
}

#[tokio::test]
async fn test_store_failure_becomes_generic_violation() {
    let app = TestApp::new();
    let account_id = app.approved_account("editor@example.com", "Str0ngPass!");
    app.identity.fail_writes.store(true, Ordering::SeqCst);

    let outcome = app
        .changer
        .change_password(PasswordChangeRequest::self_service(
            account_id,
            None,
            pw("N3wPassword!"),
        ))
        .await;

    assert_eq!(outcome.violations(), &[PolicyViolation::StoreFailure]);
    // Old credential still in place
    assert!(app
        .identity
        .verify_password(account_id, &pw("Str0ngPass!"))
        .await
        .unwrap());
}

#[tokio::test]
async fn test_history_read_failure_is_store_failure() {
    let app = TestApp::new();
    let account_id = app.approved_account("editor@example.com", "Str0ngPass!");
    app.identity.fail_reads.store(true, Ordering::SeqCst);

    let outcome = app
        .changer
        .change_password(PasswordChangeRequest::self_service(
            account_id,
            None,
            pw("N3wPassword!"),
        ))
        .await;

    assert_eq!(outcome.violations(), &[PolicyViolation::StoreFailure]);
    assert_eq!(app.identity.set_password_count(), 0);
}

#[tokio::test]
async fn test_reused_password_is_rejected() {
    let app = TestApp::new();
    let account_id = app.approved_account("editor@example.com", "Str0ngPass!");

    let outcome = app
        .changer
        .change_password(PasswordChangeRequest::self_service(
            account_id,
            None,
            pw("Str0ngPass!"),
        ))
        .await;

    assert_eq!(
        outcome.violations(),
        &[PolicyViolation::PasswordReused { history_depth: 5 }]
    );
    assert_eq!(app.identity.set_password_count(), 0);
}

#[tokio::test]
async fn test_history_disabled_allows_reuse() {
    let policy = PasswordPolicy {
        history_depth: 0,
        ..PasswordPolicy::default()
    };
    let app = TestApp::with_policy(policy);
    let account_id = app.approved_account("editor@example.com", "Str0ngPass!");

    let outcome = app
        .changer
        .change_password(PasswordChangeRequest::self_service(
            account_id,
            None,
            pw("Str0ngPass!"),
        ))
        .await;

    assert!(outcome.is_success());
    assert_eq!(app.identity.read_count(), 0);
}

#[tokio::test]
async fn test_incorrect_current_password_is_rejected() {
    let app = TestApp::new();
    let account_id = app.approved_account("editor@example.com", "Str0ngPass!");

    let outcome = app
        .changer
        .change_password(PasswordChangeRequest::self_service(
            account_id,
            Some(pw("Wr0ngGuess!")),
            pw("N3wPassword!"),
        ))
        .await;

    assert_eq!(
        outcome.violations(),
        &[PolicyViolation::IncorrectCurrentPassword]
    );
    assert_eq!(app.identity.set_password_count(), 0);
}

#[tokio::test]
async fn test_wrong_current_password_hides_history_match() {
    let app = TestApp::new();
    let account_id = app.approved_account("editor@example.com", "0ldPassw0rd!");
    app.identity
        .seed_password(account_id, "Str0ngPass!")
        .expect("Failed to seed password");

    // Both the current and an earlier password are rejected the same way
    for guess in ["Str0ngPass!", "0ldPassw0rd!", "Wr0ngGuess!"] {
        let outcome = app
            .changer
            .change_password(PasswordChangeRequest::self_service(
                account_id,
                Some(pw("N0tTheCurrent1")),
                pw(guess),
            ))
            .await;

        assert_eq!(
            outcome.violations(),
            &[PolicyViolation::IncorrectCurrentPassword],
            "guess {guess:?}"
        );
    }

    assert_eq!(app.identity.set_password_count(), 0);
}

#[tokio::test]
async fn test_reuse_reported_after_current_password_verified() {
    let app = TestApp::new();
    let account_id = app.approved_account("editor@example.com", "0ldPassw0rd!");
    app.identity
        .seed_password(account_id, "Str0ngPass!")
        .expect("Failed to seed password");

    let outcome = app
        .changer
        .change_password(PasswordChangeRequest::self_service(
            account_id,
            Some(pw("Str0ngPass!")),
            pw("0ldPassw0rd!"),
        ))
        .await;

    assert_eq!(
        outcome.violations(),
        &[PolicyViolation::PasswordReused { history_depth: 5 }]
    );
    assert_eq!(app.identity.set_password_count(), 0);
}

/// Identity store that never answers in time.
struct StalledIdentityStore;

#[async_trait]
impl IdentityStore for StalledIdentityStore {
    async fn password_history(
        &self,
        _account_id: Uuid,
        _depth: usize,
    ) -> Result<Vec<PasswordHashString>, StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(Vec::new())
    }

    async fn verify_password(
        &self,
        _account_id: Uuid,
        _password: &Password,
    ) -> Result<bool, StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(true)
    }

    async fn set_password(
        &self,
        _account_id: Uuid,
        _password: &Password,
    ) -> Result<(), StoreError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    }
}

#[tokio::test]
async fn test_store_timeout_becomes_store_failure() {
    let app = TestApp::with_identity_store(
        Arc::new(StalledIdentityStore),
        Arc::new(MockIdentityStore::new()),
        PasswordPolicy::default(),
        Duration::from_millis(50),
    );

    let outcome = app
        .changer
        .change_password(PasswordChangeRequest::admin_reset(
            Uuid::new_v4(),
            Uuid::new_v4(),
        ))
        .await;

    assert_eq!(outcome.violations(), &[PolicyViolation::StoreFailure]);
    assert!(outcome.generated_password().is_none());
}
