//! Random password generation for administrator resets.

use rand::{rngs::OsRng, seq::SliceRandom, Rng};
use secrecy::SecretString;

use crate::models::PasswordPolicy;
use crate::services::policy::SPECIAL_CHARACTERS;

const UPPERCASE: &str = "ABCDEFGHJKLMNPQRSTUVWXYZ";
const LOWERCASE: &str = "abcdefghijkmnopqrstuvwxyz";
const DIGITS: &str = "23456789";

pub trait PasswordGenerator: Send + Sync {
    /// Produce a password that satisfies `policy`.
    fn generate(&self, policy: &PasswordPolicy) -> SecretString;
}

/// Generator backed by the operating system CSPRNG.
///
/// Always includes one character from every required class, then fills up to
/// the target length from the combined alphabet and shuffles.
#[derive(Debug, Clone)]
pub struct RandomPasswordGenerator {
    length: usize,
}

impl RandomPasswordGenerator {
    pub fn new(length: usize) -> Self {
        Self { length }
    }
}

impl Default for RandomPasswordGenerator {
    fn default() -> Self {
        Self::new(16)
    }
}

impl PasswordGenerator for RandomPasswordGenerator {
    fn generate(&self, policy: &PasswordPolicy) -> SecretString {
        let mut rng = OsRng;

        let mut required: Vec<&str> = Vec::new();
        if policy.require_uppercase {
            required.push(UPPERCASE);
        }
        if policy.require_lowercase {
            required.push(LOWERCASE);
        }
        if policy.require_number {
            required.push(DIGITS);
        }
        if policy.require_special {
            required.push(SPECIAL_CHARACTERS);
        }

        let length = self
            .length
            .max(policy.min_length)
            .max(required.len())
            .min(policy.max_length.max(required.len()));

        let alphabet: Vec<char> = [UPPERCASE, LOWERCASE, DIGITS, SPECIAL_CHARACTERS]
            .concat()
            .chars()
            .collect();

        let mut chars: Vec<char> = required
            .iter()
            .map(|set| pick(set, &mut rng))
            .collect();

        while chars.len() < length {
            chars.push(alphabet[rng.gen_range(0..alphabet.len())]);
        }

        chars.shuffle(&mut rng);
        SecretString::new(chars.into_iter().collect())
    }
}

fn pick<R: Rng>(set: &str, rng: &mut R) -> char {
    let chars: Vec<char> = set.chars().collect();
    chars[rng.gen_range(0..chars.len())]
}
