//! Password policy enforcement for new passwords.

use filehub_core::config::AuthConfig;
use filehub_core::error::AppError;

/// Validates password strength against configured policies.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    /// Minimum password length in characters.
    min_length: usize,
    /// Minimum zxcvbn score.
    min_strength: zxcvbn::Score,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
            min_strength: score_from_u8(config.password_min_strength),
        }
    }

    /// Validates a password chosen by `username`.
    ///
    /// Returns `Ok(())` if the password meets all requirements,
    /// or an error describing the first violation found.
    pub fn validate(&self, username: &str, password: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_length
            )));
        }

        // The username is passed as a user input so passwords built from it score low.
        let estimate = zxcvbn::zxcvbn(password, &[username]);
        if estimate.score() < self.min_strength {
            return Err(AppError::validation(
                "Password is too weak. Please use a stronger password with more entropy.",
            ));
        }

        Ok(())
    }

    /// Validates that a new password differs from the old one.
    pub fn validate_not_same(
        &self,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        if old_password == new_password {
            return Err(AppError::validation(
                "New password must be different from the current password",
            ));
        }
        Ok(())
    }
}

fn score_from_u8(score: u8) -> zxcvbn::Score {
    match score {
        0 => zxcvbn::Score::Zero,
        1 => zxcvbn::Score::One,
        2 => zxcvbn::Score::Two,
        3 => zxcvbn::Score::Three,
        _ => zxcvbn::Score::Four,
    }
}
