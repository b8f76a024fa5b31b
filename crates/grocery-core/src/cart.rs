//! # Cart Ledger
//!
//! The in-memory mapping from product id to quantity that backs the shopping
//! cart, plus the count/amount summaries the checkout surface displays.
//!
//! ## Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Ledger Operations                               │
//! │                                                                         │
//! │  Shopper Action           Ledger Call              Effect               │
//! │  ──────────────           ───────────              ──────               │
//! │                                                                         │
//! │  Click "Add" ───────────► add_one(id) ──────────► qty += 1 (or 1)      │
//! │                                                                         │
//! │  Quantity stepper ──────► set_quantity(id, n) ──► qty = n, n<=0 drops  │
//! │                                                                         │
//! │  Click "−" ─────────────► remove_one(id) ───────► qty -= 1, 0 drops    │
//! │                                                                         │
//! │  Cart badge ────────────► count() ──────────────► Σ qty                 │
//! │                                                                         │
//! │  Checkout total ────────► amount(catalog) ──────► round(Σ price × qty)  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Copy-on-Write
//! Every mutation clones the current map, edits the clone and swaps the
//! `Arc`. A [`CartLedger::snapshot`] taken earlier keeps pointing at the old
//! map, so a reader never sees a half-applied change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use ts_rs::TS;

use crate::money::{Money, UnitPrice};
use crate::types::Catalog;

/// Immutable view of the ledger at one point in time.
pub type CartSnapshot = Arc<BTreeMap<String, i64>>;

// =============================================================================
// Cart Event
// =============================================================================

/// What a ledger mutation did, for the notification surface.
///
/// Events are observations, not state: dropping one changes nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[ts(export)]
pub enum CartEvent {
    /// One unit was added; `quantity` is the new line quantity.
    Added { product_id: String, quantity: i64 },

    /// The quantity was set explicitly; `0` means the line was dropped.
    Updated { product_id: String, quantity: i64 },

    /// One unit was removed; `quantity` is what is left (0 = line gone).
    Removed { product_id: String, quantity: i64 },
}

impl CartEvent {
    /// The toast text for this event.
    pub fn message(&self) -> &'static str {
        match self {
            CartEvent::Added { .. } => "Added to Cart",
            CartEvent::Updated { .. } => "Cart Updated",
            CartEvent::Removed { .. } => "Removed from Cart",
        }
    }

    /// The product the event concerns.
    pub fn product_id(&self) -> &str {
        match self {
            CartEvent::Added { product_id, .. }
            | CartEvent::Updated { product_id, .. }
            | CartEvent::Removed { product_id, .. } => product_id,
        }
    }

    /// Line quantity after the mutation.
    pub fn quantity(&self) -> i64 {
        match self {
            CartEvent::Added { quantity, .. }
            | CartEvent::Updated { quantity, .. }
            | CartEvent::Removed { quantity, .. } => *quantity,
        }
    }
}

// =============================================================================
// Cart Ledger
// =============================================================================

/// Product id → quantity.
///
/// ## Invariants
/// - Every stored quantity is > 0; a line reaching 0 is removed
/// - The catalog is never consulted except by [`CartLedger::amount`]
#[derive(Debug, Clone, Default)]
pub struct CartLedger {
    items: CartSnapshot,
}

impl CartLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        CartLedger::default()
    }

    /// Applies `edit` to a fresh copy of the map and publishes the copy.
    fn replace_with<R>(&mut self, edit: impl FnOnce(&mut BTreeMap<String, i64>) -> R) -> R {
        let mut next = BTreeMap::clone(&self.items);
        let result = edit(&mut next);
        self.items = Arc::new(next);
        result
    }

    /// Adds one unit of `product_id`, inserting the line if needed.
    pub fn add_one(&mut self, product_id: &str) -> CartEvent {
        let quantity = self.replace_with(|items| {
            let qty = items.entry(product_id.to_string()).or_insert(0);
            *qty = qty.saturating_add(1);
            *qty
        });

        CartEvent::Added {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    /// Sets the quantity of `product_id` exactly.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: the line is removed (no-op if absent)
    /// - otherwise: the line is set to `quantity`, inserted if absent
    ///
    /// Unlike `add_one`/`remove_one` this is not incremental; it backs the
    /// quantity stepper.
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CartEvent {
        let quantity = quantity.max(0);

        self.replace_with(|items| {
            if quantity == 0 {
                items.remove(product_id);
            } else {
                items.insert(product_id.to_string(), quantity);
            }
        });

        CartEvent::Updated {
            product_id: product_id.to_string(),
            quantity,
        }
    }

    /// Removes one unit of `product_id`.
    ///
    /// Returns `None` and leaves the ledger untouched when the product is not
    /// in the cart, so no "removed" notification is raised for it.
    pub fn remove_one(&mut self, product_id: &str) -> Option<CartEvent> {
        if !self.items.contains_key(product_id) {
            return None;
        }

        let quantity = self.replace_with(|items| {
            let left = items.get(product_id).map_or(0, |qty| qty - 1);
            if left <= 0 {
                items.remove(product_id);
                0
            } else {
                items.insert(product_id.to_string(), left);
                left
            }
        });

        Some(CartEvent::Removed {
            product_id: product_id.to_string(),
            quantity,
        })
    }

    /// Total units in the cart (not the number of distinct products).
    pub fn count(&self) -> i64 {
        self.items.values().fold(0i64, |acc, q| acc.saturating_add(*q))
    }

    /// Total price of the cart against `catalog`.
    ///
    /// Lines whose product is missing from the catalog contribute nothing.
    /// Line totals are summed at full catalog precision and the sum is
    /// rounded to cents once, half away from zero.
    pub fn amount(&self, catalog: &Catalog) -> Money {
        let total: UnitPrice = self
            .items
            .iter()
            .filter_map(|(id, qty)| catalog.price_of(id).map(|price| price * *qty))
            .sum();
        total.round_to_cents()
    }

    /// Quantity of one product, 0 when absent.
    pub fn quantity_of(&self, product_id: &str) -> i64 {
        self.items.get(product_id).copied().unwrap_or(0)
    }

    /// Number of distinct products.
    pub fn distinct_items(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines in product-id order.
    pub fn lines(&self) -> impl Iterator<Item = (&str, i64)> {
        self.items.iter().map(|(id, qty)| (id.as_str(), *qty))
    }

    /// A cheap, immutable view of the current contents.
    pub fn snapshot(&self) -> CartSnapshot {
        Arc::clone(&self.items)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
