//! # grocery-core: Pure Storefront Logic for GroceryGuru
//!
//! This crate holds the two stateful pieces of the storefront as pure,
//! synchronous code with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     GroceryGuru Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  Storefront surface (web / CLI)                 │   │
//! │  │    Product list ──► Cart ──► Login modal ──► Password reset     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           grocery-client (AuthFlow driver, AppState)            │   │
//! │  │           HTTP calls, timeouts, status message timer            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ grocery-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │   auth    │  │   │
//! │  │   │  Product  │  │   Money   │  │  Ledger   │  │ AuthScreen│  │   │
//! │  │   │  Catalog  │  │           │  │ CartEvent │  │ messages  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO TIMERS • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Catalog, User)
//! - [`money`] - Money type with integer arithmetic
//! - [`cart`] - The copy-on-write cart ledger
//! - [`auth`] - The login / password-recovery screen machine
//! - [`error`] - Domain error types
//! - [`validation`] - Form input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use grocery_core::cart::CartLedger;
//! use grocery_core::money::Money;
//! use grocery_core::types::{Catalog, Product};
//!
//! let catalog = Catalog::new(vec![Product::new("p1", "Apples", Money::from_cents(250))]).unwrap();
//!
//! let mut cart = CartLedger::new();
//! cart.add_one("p1");
//! cart.add_one("p1");
//! cart.add_one("p1");
//!
//! assert_eq!(cart.count(), 3);
//! assert_eq!(cart.amount(&catalog).cents(), 750);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use auth::{AuthAction, AuthRequest, AuthScreen, ScreenKind};
pub use cart::{CartEvent, CartLedger};
pub use error::{AuthError, AuthResult, CoreError, CoreResult, ValidationError};
pub use money::{Money, UnitPrice};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// How long a transient status message stays visible, in seconds.
pub const STATUS_MESSAGE_SECS: u64 = 4;

/// Default timeout for each auth request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Maximum accepted length of an email address.
pub const MAX_EMAIL_LEN: usize = 254;
