//! # Error Types
//!
//! Domain-specific error types for grocery-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  grocery-core errors (this file)                                       │
//! │  ├── ValidationError  - Missing/invalid form input (no network call)   │
//! │  ├── AuthError        - Outcome of an auth step                        │
//! │  │   ├── Validation        caught locally                              │
//! │  │   ├── ServerRejected    { success: false, message }                 │
//! │  │   ├── TransportFailure  no usable response                          │
//! │  │   ├── Timeout           request outlived its deadline               │
//! │  │   └── InvalidTransition action not offered on this screen           │
//! │  └── CoreError        - Catalog construction failures                  │
//! │                                                                         │
//! │  grocery-client errors (separate crate)                                │
//! │  └── ClientError      - Config / setup failures                        │
//! │                                                                         │
//! │  Every AuthError ends up as a status line, never as a crash.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::auth::{AuthAction, AuthRequest, ScreenKind};

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These are raised before any request leaves the process.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Text shown to the user in the form's status line.
    ///
    /// ## Example
    /// ```rust
    /// use grocery_core::ValidationError;
    ///
    /// let err = ValidationError::Required { field: "email".to_string() };
    /// assert_eq!(err.prompt(), "Please enter email");
    /// ```
    pub fn prompt(&self) -> String {
        match self {
            ValidationError::Required { field } => format!("Please enter {}", field),
            other => other.to_string(),
        }
    }
}

// =============================================================================
// Auth Error
// =============================================================================

/// Failure of a single auth step.
///
/// None of these are fatal: the flow stays on a retryable screen and the
/// consuming surface shows [`AuthError::user_message`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Local input was missing; no request was sent.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The server answered but reported failure.
    #[error("Server rejected request: {}", message.as_deref().unwrap_or("no message"))]
    ServerRejected { message: Option<String> },

    /// No usable response (connection refused, DNS, unreadable body).
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// The request did not complete before its deadline.
    #[error("Request timed out after {secs} seconds")]
    Timeout { secs: u64 },

    /// The caller asked for an action the current screen does not offer.
    #[error("Cannot {action} from the {screen} screen")]
    InvalidTransition {
        screen: ScreenKind,
        action: AuthAction,
    },
}

impl AuthError {
    /// Returns true if the same request may simply be tried again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuthError::ServerRejected { .. }
                | AuthError::TransportFailure(_)
                | AuthError::Timeout { .. }
        )
    }

    /// Returns true if no request reached the network.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            AuthError::Validation(_) | AuthError::InvalidTransition { .. }
        )
    }

    /// Maps the error to the message displayed for `request`.
    ///
    /// ## Mapping
    /// ```text
    /// Validation        → "Please enter <field>"
    /// ServerRejected    → server message, or the request's fallback
    /// TransportFailure  → "Network error while <doing request>"
    /// Timeout           → same as TransportFailure
    /// InvalidTransition → error text
    /// ```
    pub fn user_message(&self, request: AuthRequest) -> String {
        match self {
            AuthError::Validation(v) => v.prompt(),
            AuthError::ServerRejected { message } => message
                .as_deref()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(request.rejected_fallback())
                .to_string(),
            AuthError::TransportFailure(_) | AuthError::Timeout { .. } => {
                request.network_error().to_string()
            }
            AuthError::InvalidTransition { .. } => self.to_string(),
        }
    }
}

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while assembling domain data (catalogs).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Two catalog entries share an identifier.
    #[error("Duplicate product id in catalog: {0}")]
    DuplicateProduct(String),

    /// A price could not be represented in cents.
    #[error("Invalid price for product {id}: {reason}")]
    InvalidPrice { id: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Convenience type alias for the outcome of an auth step.
pub type AuthResult<T> = Result<T, AuthError>;

// =============================================================================
// Unit Tests
// =============================================================================
