//! # Validation Module
//!
//! Form input checks run before any auth request is dispatched.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE                                                  │
//! │  ├── Required fields present                                           │
//! │  └── Failure → "Please enter <field>", no request sent                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Auth server                                                  │
//! │  ├── Account exists, code valid and unexpired                          │
//! │  └── Failure → { success: false, message }                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only presence is checked locally. Whether an address or code is actually
//! valid is the server's decision.
//!
//! ## Usage
//! ```rust
//! use grocery_core::validation::{validate_email, validate_code};
//!
//! assert_eq!(validate_email("  a@b.com ").unwrap(), "a@b.com");
//! assert!(validate_code("").is_err());
//! ```

use crate::error::ValidationError;
use crate::MAX_EMAIL_LEN;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn required(field: &str) -> ValidationError {
    ValidationError::Required {
        field: field.to_string(),
    }
}

// =============================================================================
// Identity Fields
// =============================================================================

/// Validates an email address and returns it trimmed.
///
/// ## Rules
/// - Must not be empty or whitespace
/// - At most 254 characters
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(required("email"));
    }

    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LEN,
        });
    }

    Ok(email.to_string())
}

/// Validates a display name for registration and returns it trimmed.
pub fn validate_name(name: &str) -> ValidationResult<String> {
    let name = name.trim();

    if name.is_empty() {
        return Err(required("name"));
    }

    Ok(name.to_string())
}

// =============================================================================
// Secrets
// =============================================================================

/// Validates a one-time code and returns it trimmed.
pub fn validate_code(code: &str) -> ValidationResult<String> {
    let code = code.trim();

    if code.is_empty() {
        return Err(required("OTP"));
    }

    Ok(code.to_string())
}

/// Validates a login password.
///
/// Passwords are never trimmed; only a completely empty value is rejected.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(required("password"));
    }

    Ok(())
}

/// Validates the new password on the reset screen.
pub fn validate_new_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(required("new password"));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
