//! Services layer for the credential core.
//!
//! Policy evaluation, password change orchestration, invited-account
//! activation, and the store and session seams they depend on.

mod account_store;
pub mod activation;
pub mod credentials;
mod database;
pub mod error;
mod generator;
mod identity_store;
pub mod password_changer;
pub mod policy;
mod session;
mod text;

pub use account_store::{AccountStore, MockAccountStore};
pub use activation::AccountActivation;
pub use credentials::{ChangePasswordInput, CredentialService};
pub use database::Database;
pub use error::{CredentialError, StoreError};
pub use generator::{PasswordGenerator, RandomPasswordGenerator};
pub use identity_store::{IdentityStore, MockIdentityStore};
pub use password_changer::PasswordChanger;
pub use policy::{PasswordViolations, PolicyService, PolicyViolation};
pub use session::{AuthContext, AuthSession, TokenExpirySession};
pub use text::{DefaultTextService, TextService};
