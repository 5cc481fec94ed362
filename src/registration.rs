//! Registration form validation
//!
//! Client-side checks run before the registration form is submitted. All
//! rules are evaluated so every problem can be shown at once.

use serde::{Deserialize, Serialize};

/// Minimum password length in characters
pub const MIN_PASSWORD_LEN: usize = 6;

/// Submitted registration fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

/// Form field an error is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationField {
    Username,
    Password,
    ConfirmPassword,
}

/// A validation failure shown next to its field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: RegistrationField,
    pub message: String,
}

impl FieldError {
    fn new(field: RegistrationField, message: &str) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

impl RegistrationForm {
    /// Validate the form, returning every failing rule in field order
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.username.trim().is_empty() {
            errors.push(FieldError::new(
                RegistrationField::Username,
                "學生姓名不能為空。",
            ));
        }

        if self.password.chars().count() < MIN_PASSWORD_LEN {
            errors.push(FieldError::new(
                RegistrationField::Password,
                "密碼長度至少需要6位。",
            ));
        }

        if self.confirm_password != self.password {
            errors.push(FieldError::new(
                RegistrationField::ConfirmPassword,
                "兩次輸入的密碼不一致。",
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
