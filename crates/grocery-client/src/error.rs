//! # Client Error Types
//!
//! Errors raised while setting the storefront up: loading configuration,
//! reading a catalog, building the HTTP client.
//!
//! Failures of individual auth steps are not here. Those are
//! [`grocery_core::AuthError`] values and always end up as a status line.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Client Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │    Catalog      │  │     HTTP setup          │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  CatalogLoad-   │  │  HttpClient             │ │
//! │  │  InvalidUrl     │  │  Failed         │  │                         │ │
//! │  │  ConfigLoad/    │  │                 │  │                         │ │
//! │  │  SaveFailed     │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for client setup operations.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid storefront configuration.
    #[error("Invalid storefront configuration: {0}")]
    InvalidConfig(String),

    /// Invalid API URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(String),

    /// Failed to load config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to save config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Catalog Errors
    // =========================================================================
    /// The product list could not be read or parsed.
    #[error("Failed to load catalog: {0}")]
    CatalogLoadFailed(String),

    // =========================================================================
    // HTTP Errors
    // =========================================================================
    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ClientError {
    fn from(err: toml::de::Error) -> Self {
        ClientError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        ClientError::ConfigSaveFailed(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::CatalogLoadFailed(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::HttpClient(err.to_string())
    }
}

impl From<grocery_core::CoreError> for ClientError {
    fn from(err: grocery_core::CoreError) -> Self {
        ClientError::CatalogLoadFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl ClientError {
    /// Returns true if this error indicates a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidConfig(_)
                | ClientError::InvalidUrl(_)
                | ClientError::ConfigLoadFailed(_)
                | ClientError::ConfigSaveFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors() {
        assert!(ClientError::InvalidConfig("bad".into()).is_config_error());
        assert!(ClientError::InvalidUrl("x".into()).is_config_error());
        assert!(!ClientError::CatalogLoadFailed("x".into()).is_config_error());
        assert!(!ClientError::HttpClient("x".into()).is_config_error());
    }

    #[test]
    fn test_conversions() {
        let err: ClientError = url::Url::parse("not a url").unwrap_err().into();
        assert!(matches!(err, ClientError::InvalidUrl(_)));

        let err: ClientError = serde_json::from_str::<u32>("{").unwrap_err().into();
        assert!(matches!(err, ClientError::CatalogLoadFailed(_)));
    }
}
