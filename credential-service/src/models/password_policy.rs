use serde::{Deserialize, Serialize};

/// Password requirements applied to every credential change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum password length in characters (default: 8)
    pub min_length: usize,

    /// Maximum password length in characters (default: 256)
    pub max_length: usize,

    /// Require at least one uppercase letter
    pub require_uppercase: bool,

    /// Require at least one lowercase letter
    pub require_lowercase: bool,

    /// Require at least one numeric digit
    pub require_number: bool,

    /// Require at least one special character
    pub require_special: bool,

    /// How many previous passwords may not be reused. 0 disables the check.
    pub history_depth: usize,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 256,
            require_uppercase: true,
            require_lowercase: false,
            require_number: true,
            require_special: false,
            history_depth: 5,
        }
    }
}

impl PasswordPolicy {
    pub fn tracks_history(&self) -> bool {
        self.history_depth > 0
    }

    /// Number of character classes a password must contain.
    pub fn required_class_count(&self) -> usize {
        [
            self.require_uppercase,
            self.require_lowercase,
            self.require_number,
            self.require_special,
        ]
        .into_iter()
        .filter(|required| *required)
        .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_class_count() {
        assert_eq!(PasswordPolicy::default().required_class_count(), 2);

        let policy = PasswordPolicy {
            require_lowercase: true,
            require_special: true,
            ..PasswordPolicy::default()
        };
        assert_eq!(policy.required_class_count(), 4);
    }
}
