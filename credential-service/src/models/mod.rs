pub mod account;
pub mod notification;
pub mod password_change;
pub mod password_policy;

pub use account::{Account, AccountState, ActivatedAccountView};
pub use notification::{Notification, NotificationSeverity, WithNotifications};
pub use password_change::{PasswordChangeOutcome, PasswordChangeRequest};
pub use password_policy::PasswordPolicy;
