//! # grocery-client: The Storefront's Connection to the Outside World
//!
//! Runs the pure state machines of `grocery-core` against real I/O: the auth
//! API, the clock, config files and catalog files.
//!
//! ## Module Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         grocery-client                                  │
//! │                                                                         │
//! │   config ──► backend ──► flow ◄── status                                │
//! │     │          │          │                                             │
//! │     │          │          └── AuthScreen (core)                         │
//! │     │          └── protocol (JSON bodies)                               │
//! │     │                                                                   │
//! │     └──► catalog ──► store (AppState) ◄── CartLedger (core)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use grocery_client::{AppState, AuthFlow, HttpAuthBackend, StorefrontConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StorefrontConfig::load(None)?;
//! let app = AppState::from_config(&config)?;
//! let backend = Arc::new(HttpAuthBackend::new(&config.api)?);
//! let mut flow = AuthFlow::from_config(backend, &config);
//!
//! flow.forgot_password()?;
//! flow.request_code("shopper@example.com").await?;
//! println!("{:?}", flow.message());
//!
//! app.add_to_cart("gd46g23h");
//! println!("{}", app.format_amount(app.cart_amount()));
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod catalog;
pub mod config;
pub mod error;
pub mod flow;
pub mod protocol;
pub mod status;
pub mod store;

pub use backend::{AuthBackend, HttpAuthBackend};
pub use catalog::{demo_catalog, load_catalog, parse_catalog};
pub use config::{AccountsMode, StorefrontConfig};
pub use error::{ClientError, ClientResult};
pub use flow::AuthFlow;
pub use status::{StatusBoard, StatusKind, StatusMessage};
pub use store::{AppState, CartLine, CartState, Notification};
