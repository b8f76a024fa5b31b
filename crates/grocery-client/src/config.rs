//! # Storefront Configuration
//!
//! Configuration for the auth endpoints, the status line and the catalog.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GROCERY_API_URL=https://shop.example.com                           │
//! │     GROCERY_ACCOUNTS=remote                                            │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/groceryguru/storefront.toml (Linux)                      │
//! │     ~/Library/Application Support/com.groceryguru.storefront/... (mac) │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     localhost:4000, demo accounts, 15s timeout                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # storefront.toml
//! [api]
//! base_url = "http://localhost:4000"
//! send_code_path = "/api/send-otp"
//! verify_code_path = "/api/verify-otp"
//! reset_password_path = "/api/reset-password"
//! login_path = "/api/user/login"
//! register_path = "/api/user/register"
//! request_timeout_secs = 15
//! accounts = "demo"  # demo | remote
//!
//! [ui]
//! status_message_secs = 4
//! currency_symbol = "$"
//!
//! [catalog]
//! path = "products.json"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use grocery_core::{DEFAULT_REQUEST_TIMEOUT_SECS, STATUS_MESSAGE_SECS};

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Accounts Mode
// =============================================================================

/// Where login and registration are answered.
///
/// Password recovery always goes to the API; only login and sign-up have a
/// demo stand-in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountsMode {
    /// Login always succeeds as the demo user, registration always succeeds.
    #[default]
    Demo,

    /// Login and registration are posted to the API.
    Remote,
}

impl std::fmt::Display for AccountsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountsMode::Demo => write!(f, "demo"),
            AccountsMode::Remote => write!(f, "remote"),
        }
    }
}

impl std::str::FromStr for AccountsMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "demo" | "local" => Ok(AccountsMode::Demo),
            "remote" | "api" => Ok(AccountsMode::Remote),
            other => Err(ClientError::InvalidConfig(format!(
                "Unknown accounts mode: '{}'. Valid options: demo, remote",
                other
            ))),
        }
    }
}

// =============================================================================
// API Settings
// =============================================================================

/// Auth endpoint locations and request limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_send_code_path")]
    pub send_code_path: String,

    #[serde(default = "default_verify_code_path")]
    pub verify_code_path: String,

    #[serde(default = "default_reset_password_path")]
    pub reset_password_path: String,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_register_path")]
    pub register_path: String,

    /// Deadline for each request, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default)]
    pub accounts: AccountsMode,
}

fn default_base_url() -> String {
    "http://localhost:4000".to_string()
}
fn default_send_code_path() -> String {
    "/api/send-otp".to_string()
}
fn default_verify_code_path() -> String {
    "/api/verify-otp".to_string()
}
fn default_reset_password_path() -> String {
    "/api/reset-password".to_string()
}
fn default_login_path() -> String {
    "/api/user/login".to_string()
}
fn default_register_path() -> String {
    "/api/user/register".to_string()
}
fn default_request_timeout() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            send_code_path: default_send_code_path(),
            verify_code_path: default_verify_code_path(),
            reset_password_path: default_reset_password_path(),
            login_path: default_login_path(),
            register_path: default_register_path(),
            request_timeout_secs: default_request_timeout(),
            accounts: AccountsMode::default(),
        }
    }
}

impl ApiSettings {
    /// Per-request deadline.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Appends `path` to the base URL, keeping any path prefix the base
    /// carries: `https://host/shop` + `/api/send-otp` is
    /// `https://host/shop/api/send-otp`.
    pub fn endpoint(&self, path: &str) -> ClientResult<Url> {
        let mut base = Url::parse(&self.base_url)?;
        if !base.path().ends_with('/') {
            let prefix = format!("{}/", base.path());
            base.set_path(&prefix);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }
}

// =============================================================================
// UI Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// How long a status message stays visible.
    #[serde(default = "default_status_secs")]
    pub status_message_secs: u64,

    /// Prefix for every displayed amount.
    #[serde(default = "default_currency")]
    pub currency_symbol: String,
}

fn default_status_secs() -> u64 {
    STATUS_MESSAGE_SECS
}
fn default_currency() -> String {
    "$".to_string()
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            status_message_secs: default_status_secs(),
            currency_symbol: default_currency(),
        }
    }
}

impl UiSettings {
    pub fn status_duration(&self) -> Duration {
        Duration::from_secs(self.status_message_secs)
    }
}

// =============================================================================
// Catalog Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// JSON product list; the built-in demo catalog when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete storefront configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorefrontConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub ui: UiSettings,

    #[serde(default)]
    pub catalog: CatalogSettings,
}

impl StorefrontConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (storefront.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading storefront config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load storefront config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ClientError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Storefront config saved");
        Ok(())
    }

    /// Checks the values that would otherwise fail at request time.
    pub fn validate(&self) -> ClientResult<()> {
        let url = Url::parse(&self.api.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.api.request_timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }

        if self.ui.status_message_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "status_message_secs must be greater than 0".into(),
            ));
        }

        let paths = [
            ("send_code_path", &self.api.send_code_path),
            ("verify_code_path", &self.api.verify_code_path),
            ("reset_password_path", &self.api.reset_password_path),
            ("login_path", &self.api.login_path),
            ("register_path", &self.api.register_path),
        ];
        for (name, path) in paths {
            if !path.starts_with('/') {
                return Err(ClientError::InvalidConfig(format!(
                    "{} must start with '/', got: {}",
                    name, path
                )));
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("GROCERY_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Ok(secs) = std::env::var("GROCERY_REQUEST_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.api.request_timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric request timeout"),
            }
        }

        if let Ok(mode) = std::env::var("GROCERY_ACCOUNTS") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding accounts mode from environment");
                    self.api.accounts = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown accounts mode in environment"),
            }
        }

        if let Ok(secs) = std::env::var("GROCERY_STATUS_SECS") {
            if let Ok(s) = secs.parse::<u64>() {
                self.ui.status_message_secs = s;
            }
        }

        if let Ok(symbol) = std::env::var("GROCERY_CURRENCY") {
            self.ui.currency_symbol = symbol;
        }

        if let Ok(path) = std::env::var("GROCERY_CATALOG_PATH") {
            self.catalog.path = Some(PathBuf::from(path));
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "groceryguru", "storefront")
            .map(|dirs| dirs.config_dir().join("storefront.toml"))
    }
}
