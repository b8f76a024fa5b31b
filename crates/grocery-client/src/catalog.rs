//! # Catalog Loading
//!
//! Reads the product list the storefront sells from.
//!
//! The JSON shape is the one the shop's product API serves:
//! ```json
//! [{ "_id": "gd46g23h", "name": "Potato 500g", "category": "Vegetables",
//!    "price": 25, "offerPrice": 20, "inStock": true }]
//! ```
//! `id` is accepted in place of `_id`. Prices are decimal major units and are
//! kept to six decimal places; cart totals round to cents. When an id appears
//! twice the first entry wins and the rest are logged and skipped.

use serde::Deserialize;
use std::path::Path;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use grocery_core::{Catalog, CoreError, Money, Product, UnitPrice};

use crate::config::StorefrontConfig;
use crate::error::{ClientError, ClientResult};

fn default_in_stock() -> bool {
    true
}

/// One product as it appears in a catalog file.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub offer_price: Option<f64>,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
}

impl TryFrom<CatalogRecord> for Product {
    type Error = CoreError;

    fn try_from(record: CatalogRecord) -> Result<Self, Self::Error> {
        let to_price = |amount: f64| {
            UnitPrice::from_major_f64(amount).ok_or_else(|| CoreError::InvalidPrice {
                id: record.id.clone(),
                reason: format!("{} is not a representable amount", amount),
            })
        };

        let price = to_price(record.price)?;
        let offer_price = record.offer_price.map(to_price).transpose()?;

        Ok(Product {
            id: record.id,
            name: record.name,
            category: record.category,
            price,
            offer_price,
            in_stock: record.in_stock,
        })
    }
}

/// Parses a JSON product list into a catalog.
///
/// Lookups by id resolve to the first product listed under it, so later
/// duplicates are dropped with a warning instead of failing the load.
pub fn parse_catalog(json: &str) -> ClientResult<Catalog> {
    let records: Vec<CatalogRecord> = serde_json::from_str(json)?;
    let mut seen = HashSet::with_capacity(records.len());
    let mut products = Vec::with_capacity(records.len());

    for record in records {
        if !seen.insert(record.id.clone()) {
            warn!(product_id = %record.id, "Duplicate product id in catalog, keeping first entry");
            continue;
        }
        products.push(Product::try_from(record)?);
    }

    Ok(Catalog::new(products)?)
}

/// Reads and parses a catalog file.
pub fn read_catalog(path: &Path) -> ClientResult<Catalog> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| ClientError::CatalogLoadFailed(format!("{}: {}", path.display(), e)))?;
    parse_catalog(&contents)
}

/// The catalog named by `config`, or the built-in one.
pub fn load_catalog(config: &StorefrontConfig) -> ClientResult<Catalog> {
    let catalog = match &config.catalog.path {
        Some(path) => {
            info!(?path, "Loading catalog from file");
            read_catalog(path)?
        }
        None => {
            debug!("No catalog path configured, using demo catalog");
            demo_catalog()?
        }
    };

    info!(products = catalog.len(), "Catalog loaded");
    Ok(catalog)
}

/// A small grocery assortment for demos and the CLI.
pub fn demo_catalog() -> ClientResult<Catalog> {
    let item = |id: &str, name: &str, category: &str, price: i64, offer: i64| {
        Product::new(id, name, Money::from_cents(price))
            .with_category(category)
            .with_offer(Money::from_cents(offer))
    };

    let products = vec![
        item("gd46g23h", "Potato 500g", "Vegetables", 2500, 2000),
        item("gd46g23i", "Tomato 1 kg", "Vegetables", 4000, 3500),
        item("gd46g23j", "Carrot 500g", "Vegetables", 3000, 2800),
        item("ek51j12k", "Apple 1 kg", "Fruits", 12000, 11000),
        item("ek51j12l", "Banana 1 dozen", "Fruits", 5000, 4500),
        item("ek51j12m", "Mango 1 kg", "Fruits", 15000, 14000),
        item("ek51j12n", "Amul Milk 1L", "Dairy", 6000, 5500),
        item("ek51j12o", "Paneer 200g", "Dairy", 9000, 8500),
        item("ek51j12p", "Coca-Cola 1.5L", "Drinks", 8000, 7500),
        item("ek51j12q", "Brown Bread 400g", "Bakery", 4000, 3500),
        item("ek51j12r", "Basmati Rice 5kg", "Grains", 55000, 52000),
    ];

    Ok(Catalog::new(products)?)
}
