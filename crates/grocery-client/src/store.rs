//! # Application State
//!
//! The one object the storefront surface talks to: who is signed in, whether
//! the login modal is up, the catalog, the cart and its notifications.
//!
//! ## Thread Safety Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                            AppState                                     │
//! │                                                                         │
//! │   catalog: Arc<Catalog>            read-only after load                 │
//! │   cart:    CartState               Arc<Mutex<CartLedger>>               │
//! │   session: Mutex<Session>          user, seller flag, login modal       │
//! │   notices: broadcast::Sender       one Notification per cart mutation   │
//! │                                                                         │
//! │  NOTE: locks are held only for the duration of one ledger call;         │
//! │        notifications are published after the lock is released.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

use grocery_core::cart::CartSnapshot;
use grocery_core::{AuthResult, CartEvent, CartLedger, Catalog, Money, Product, User};

use crate::catalog::load_catalog;
use crate::config::StorefrontConfig;
use crate::error::ClientResult;
use crate::flow::AuthFlow;

/// Buffered notifications per subscriber before the oldest are dropped.
const NOTIFICATION_CAPACITY: usize = 64;

// =============================================================================
// Notification
// =============================================================================

/// A toast raised by a cart mutation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub product_id: String,
    pub quantity: i64,
    pub at: DateTime<Utc>,
}

impl From<&CartEvent> for Notification {
    fn from(event: &CartEvent) -> Self {
        Notification {
            id: Uuid::new_v4(),
            message: event.message().to_string(),
            product_id: event.product_id().to_string(),
            quantity: event.quantity(),
            at: Utc::now(),
        }
    }
}

// =============================================================================
// Cart State
// =============================================================================

/// Shared handle to the ledger.
#[derive(Debug, Clone, Default)]
pub struct CartState {
    ledger: Arc<Mutex<CartLedger>>,
}

impl CartState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CartLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Executes a function with read access to the ledger.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&CartLedger) -> R,
    {
        f(&self.lock())
    }

    /// Executes a function with write access to the ledger.
    pub fn with_cart_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut CartLedger) -> R,
    {
        f(&mut self.lock())
    }
}

/// One cart row joined with its catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartLine {
    pub product_id: String,
    /// `None` when the id is no longer in the catalog.
    pub product: Option<Product>,
    pub quantity: i64,
    pub line_total: Money,
}

// =============================================================================
// App State
// =============================================================================

#[derive(Debug, Default)]
struct Session {
    user: Option<User>,
    is_seller: bool,
    login_open: bool,
}

#[derive(Debug)]
pub struct AppState {
    catalog: Arc<Catalog>,
    cart: CartState,
    session: Mutex<Session>,
    currency: String,
    notices: broadcast::Sender<Notification>,
}

impl AppState {
    pub fn new(catalog: Catalog, currency: impl Into<String>) -> Self {
        let (notices, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        Self {
            catalog: Arc::new(catalog),
            cart: CartState::new(),
            session: Mutex::new(Session::default()),
            currency: currency.into(),
            notices,
        }
    }

    /// Loads the configured catalog and currency.
    pub fn from_config(config: &StorefrontConfig) -> ClientResult<Self> {
        let catalog = load_catalog(config)?;
        Ok(Self::new(catalog, config.ui.currency_symbol.clone()))
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Session
    // =========================================================================

    pub fn sign_in(&self, user: User) {
        info!(email = %user.email, "Signed in");
        self.session().user = Some(user);
    }

    pub fn sign_out(&self) {
        let mut session = self.session();
        if let Some(user) = session.user.take() {
            info!(email = %user.email, "Signed out");
        }
        session.is_seller = false;
    }

    pub fn user(&self) -> Option<User> {
        self.session().user.clone()
    }

    pub fn set_seller(&self, is_seller: bool) {
        self.session().is_seller = is_seller;
    }

    pub fn is_seller(&self) -> bool {
        self.session().is_seller
    }

    pub fn open_login(&self) {
        self.session().login_open = true;
    }

    pub fn close_login(&self) {
        self.session().login_open = false;
    }

    pub fn is_login_open(&self) -> bool {
        self.session().login_open
    }

    /// Submits the login form; on success the user is signed in and the
    /// login modal closes.
    pub async fn complete_login(
        &self,
        flow: &mut AuthFlow,
        email: &str,
        password: &str,
    ) -> AuthResult<User> {
        let user = flow.submit_login(email, password).await?;
        self.sign_in(user.clone());
        self.close_login();
        Ok(user)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub fn products(&self) -> &Catalog {
        &self.catalog
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// `"$7.50"` with the configured symbol.
    pub fn format_amount(&self, amount: Money) -> String {
        amount.format_with(&self.currency)
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn add_to_cart(&self, product_id: &str) -> CartEvent {
        let event = self.cart.with_cart_mut(|cart| cart.add_one(product_id));
        self.publish(&event);
        event
    }

    /// Sets the quantity exactly; `<= 0` drops the line.
    pub fn update_cart_item(&self, product_id: &str, quantity: i64) -> CartEvent {
        let event = self
            .cart
            .with_cart_mut(|cart| cart.set_quantity(product_id, quantity));
        self.publish(&event);
        event
    }

    /// Removes one unit; nothing happens (and nothing is announced) when the
    /// product is not in the cart.
    pub fn remove_from_cart(&self, product_id: &str) -> Option<CartEvent> {
        let event = self.cart.with_cart_mut(|cart| cart.remove_one(product_id));
        match &event {
            Some(event) => self.publish(event),
            None => debug!(product_id, "Remove ignored, product not in cart"),
        }
        event
    }

    pub fn cart_count(&self) -> i64 {
        self.cart.with_cart(CartLedger::count)
    }

    pub fn cart_amount(&self) -> Money {
        self.cart.with_cart(|cart| cart.amount(&self.catalog))
    }

    pub fn cart_snapshot(&self) -> CartSnapshot {
        self.cart.with_cart(CartLedger::snapshot)
    }

    /// Cart rows in product-id order, priced against the catalog.
    pub fn cart_lines(&self) -> Vec<CartLine> {
        self.cart_snapshot()
            .iter()
            .map(|(id, &quantity)| {
                let product = self.catalog.get(id).cloned();
                let line_total = product
                    .as_ref()
                    .map(|p| (p.effective_price() * quantity).round_to_cents())
                    .unwrap_or_default();
                CartLine {
                    product_id: id.clone(),
                    product,
                    quantity,
                    line_total,
                }
            })
            .collect()
    }

    pub fn cart(&self) -> &CartState {
        &self.cart
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Receives a [`Notification`] for every cart mutation from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notices.subscribe()
    }

    fn publish(&self, event: &CartEvent) {
        let notice = Notification::from(event);
        debug!(
            product_id = %notice.product_id,
            quantity = notice.quantity,
            message = %notice.message,
            "Cart changed"
        );
        if self.notices.send(notice).is_err() {
            debug!("No notification subscribers");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{AuthBackend, HttpAuthBackend};
    use crate::config::{AccountsMode, ApiSettings};
    use std::time::Duration;

    fn state() -> AppState {
        let catalog = Catalog::new(vec![
            Product::new("p1", "Apples", Money::from_cents(250)),
            Product::new("p2", "Milk", Money::from_cents(199)),
        ])
        .unwrap();
        AppState::new(catalog, "$")
    }

    #[test]
    fn test_cart_operations_and_totals() {
        let app = state();
        app.add_to_cart("p1");
        app.add_to_cart("p1");
        app.remove_from_cart("p1");
        app.update_cart_item("p2", 2);

        assert_eq!(app.cart_count(), 3);
        assert_eq!(app.cart_amount(), Money::from_cents(250 + 2 * 199));
        assert_eq!(app.format_amount(app.cart_amount()), "$6.48");
    }

    #[test]
    fn test_notifications_follow_mutations() {
        let app = state();
        let mut rx = app.subscribe();

        app.add_to_cart("p1");
        app.update_cart_item("p1", 5);
        app.remove_from_cart("p1");
        assert!(app.remove_from_cart("ghost").is_none());

        let messages: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|n| n.message)
            .collect();
        assert_eq!(
            messages,
            vec!["Added to Cart", "Cart Updated", "Removed from Cart"]
        );
    }

    #[test]
    fn test_publish_without_subscribers_is_fine() {
        let app = state();
        app.add_to_cart("p1");
        assert_eq!(app.cart_count(), 1);
    }

    #[test]
    fn test_cart_lines_mark_unknown_products() {
        let app = state();
        app.update_cart_item("p1", 3);
        app.add_to_cart("ghost");

        let lines = app.cart_lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].product.is_none());
        assert!(lines[0].line_total.is_zero());
        assert_eq!(lines[1].line_total, Money::from_cents(750));
    }

    #[test]
    fn test_session_flags() {
        let app = state();
        assert!(app.user().is_none());

        app.open_login();
        assert!(app.is_login_open());
        app.sign_in(User::demo());
        app.set_seller(true);
        assert!(app.is_seller());

        app.sign_out();
        assert!(app.user().is_none());
        assert!(!app.is_seller());
    }

    #[tokio::test]
    async fn test_complete_login_with_demo_accounts() {
        let api = ApiSettings {
            accounts: AccountsMode::Demo,
            ..ApiSettings::default()
        };
        let backend: Arc<dyn AuthBackend> = Arc::new(HttpAuthBackend::new(&api).unwrap());
        let mut flow = AuthFlow::new(backend, Duration::from_secs(15), Duration::from_secs(4));

        let app = state();
        app.open_login();
        let user = app
            .complete_login(&mut flow, "anyone@shop.dev", "pw")
            .await
            .unwrap();

        assert_eq!(user, User::demo());
        assert_eq!(app.user(), Some(User::demo()));
        assert!(!app.is_login_open());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_modal_open() {
        let app = state();
        app.open_login();
        let backend: Arc<dyn AuthBackend> =
            Arc::new(HttpAuthBackend::new(&ApiSettings::default()).unwrap());
        let mut flow = AuthFlow::new(backend, Duration::from_secs(15), Duration::from_secs(4));

        assert!(app.complete_login(&mut flow, "", "pw").await.is_err());
        assert!(app.is_login_open());
        assert!(app.user().is_none());
    }
}
