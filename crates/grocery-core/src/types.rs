//! # Domain Types
//!
//! Core domain types used throughout the storefront.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Catalog      │   │      User       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  products       │   │  name           │       │
//! │  │  name, category │◄──│  id → index     │   │  email          │       │
//! │  │  price          │   │  price_of(id)   │   └─────────────────┘       │
//! │  │  offer_price    │   └─────────────────┘                              │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog is read-only from the storefront's point of view: the cart
//! ledger only ever asks it for prices.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::UnitPrice;

// =============================================================================
// Product
// =============================================================================

/// A product listed in the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Catalog identifier; the cart ledger is keyed by it.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Shelf category ("Vegetables", "Dairy", ...).
    pub category: String,

    /// List price, kept below the cent until a total is rounded.
    pub price: UnitPrice,

    /// Discounted price, when the product is on offer.
    pub offer_price: Option<UnitPrice>,

    /// Whether the product can currently be added to a cart.
    pub in_stock: bool,
}

impl Product {
    /// Creates an in-stock, uncategorised product without an offer.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: impl Into<UnitPrice>) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            price: price.into(),
            offer_price: None,
            in_stock: true,
        }
    }

    /// Sets the category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Sets the offer price.
    pub fn with_offer(mut self, offer_price: impl Into<UnitPrice>) -> Self {
        self.offer_price = Some(offer_price.into());
        self
    }

    /// The price a shopper pays: the offer price when there is one.
    #[inline]
    pub fn effective_price(&self) -> UnitPrice {
        self.offer_price.unwrap_or(self.price)
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// The externally supplied product list, indexed by id.
///
/// ## Invariants
/// - Ids are unique and non-empty
/// - No price is negative
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    products: Vec<Product>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog, rejecting duplicate ids, empty ids and negative prices.
    pub fn new(products: Vec<Product>) -> CoreResult<Self> {
        let mut index = HashMap::with_capacity(products.len());

        for (pos, product) in products.iter().enumerate() {
            if product.id.trim().is_empty() {
                return Err(ValidationError::Required {
                    field: "product id".to_string(),
                }
                .into());
            }
            if product.price.is_negative() || product.offer_price.is_some_and(|p| p.is_negative())
            {
                return Err(CoreError::InvalidPrice {
                    id: product.id.clone(),
                    reason: "price cannot be negative".to_string(),
                });
            }
            if index.insert(product.id.clone(), pos).is_some() {
                return Err(CoreError::DuplicateProduct(product.id.clone()));
            }
        }

        Ok(Catalog { products, index })
    }

    /// Looks up a product by id.
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.index.get(id).map(|&pos| &self.products[pos])
    }

    /// Effective price of a product, `None` when the id is unknown.
    pub fn price_of(&self, id: &str) -> Option<UnitPrice> {
        self.get(id).map(Product::effective_price)
    }

    /// Products in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    /// Products in a given category, in catalog order.
    pub fn in_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Product> {
        self.products
            .iter()
            .filter(move |p| p.category.eq_ignore_ascii_case(category))
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Checks if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

// =============================================================================
// User
// =============================================================================

/// A signed-in shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    pub name: String,
    pub email: String,
}

impl User {
    /// The account every demo login resolves to.
    pub fn demo() -> Self {
        User {
            name: "GroceryGuru".to_string(),
            email: "test@groceryguru.dev".to_string(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
