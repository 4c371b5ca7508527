//! Shopping cart models
//!
//! The cart is client-owned until checkout. It is restored from a
//! [`KeyValueStore`] when opened and the whole line list is written back after
//! every mutation.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Product;
use crate::config::CartConfig;
use crate::error::ClientResult;
use crate::storage::KeyValueStore;
use crate::types::ProductId;

/// A product and the quantity of it in the cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub product: Product,
    pub qty: u32,
}

impl CartLine {
    /// Price × quantity, saturating at `Decimal::MAX`
    pub fn subtotal(&self) -> Decimal {
        self.product.price.saturating_mul(Decimal::from(self.qty))
    }
}

/// Cart lines, newest addition first, backed by a key-value store
#[derive(Debug)]
pub struct Cart<S: KeyValueStore> {
    store: S,
    config: CartConfig,
    lines: Vec<CartLine>,
}

impl<S: KeyValueStore> Cart<S> {
    /// Open the cart stored under the default key
    pub fn open(store: S) -> Self {
        Self::load(store, CartConfig::default())
    }

    /// Restore the cart from `store`; missing or unreadable data yields an empty cart
    pub fn load(store: S, config: CartConfig) -> Self {
        let lines = match store.get(&config.storage_key) {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<CartLine>>(&raw) {
                Ok(lines) => dedupe(lines),
                Err(e) => {
                    tracing::warn!(key = %config.storage_key, error = %e, "discarding unreadable cart");
                    Vec::new()
                }
            },
        };

        tracing::debug!(lines = lines.len(), "cart restored");
        Self {
            store,
            config,
            lines,
        }
    }

    pub fn items(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product.id == product_id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &CartConfig {
        &self.config
    }

    /// Sum of price × quantity over all lines, saturating at `Decimal::MAX`
    pub fn total(&self) -> Decimal {
        self.lines
            .iter()
            .map(CartLine::subtotal)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Add `qty` of `product`, merging into an existing line
    ///
    /// The resulting quantity never exceeds the product's stock, or the
    /// configured ceiling when stock is unknown.
    pub fn add_to_cart(&mut self, product: Product, qty: u32) {
        let ceiling = product.quantity_ceiling(self.config.stock_ceiling);

        match self.lines.iter_mut().find(|l| l.product.id == product.id) {
            Some(line) => {
                line.qty = ceiling.min(line.qty.saturating_add(qty));
                tracing::debug!(product_id = %product.id, qty = line.qty, "cart line updated");
            }
            None => {
                let qty = ceiling.min(qty);
                tracing::debug!(product_id = %product.id, qty, "cart line added");
                self.lines.insert(0, CartLine { product, qty });
            }
        }

        self.persist();
    }

    pub fn add_one(&mut self, product: Product) {
        self.add_to_cart(product, 1);
    }

    /// Set the quantity of a line as given; stock is not re-checked here
    pub fn update_quantity(&mut self, product_id: &ProductId, qty: u32) {
        if let Some(line) = self.lines.iter_mut().find(|l| &l.product.id == product_id) {
            line.qty = qty;
            tracing::debug!(product_id = %product_id, qty, "cart quantity set");
        }
        self.persist();
    }

    pub fn remove(&mut self, product_id: &ProductId) {
        self.lines.retain(|l| &l.product.id != product_id);
        self.persist();
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Serialized line list, as written to the store
    pub fn to_json(&self) -> ClientResult<String> {
        Ok(serde_json::to_string(&self.lines)?)
    }

    fn persist(&self) {
        let result = self
            .to_json()
            .and_then(|json| self.store.set(&self.config.storage_key, &json));

        if let Err(e) = result {
            tracing::warn!(key = %self.config.storage_key, error = %e, "failed to persist cart");
        }
    }
}

/// Keep the first line for each product id
fn dedupe(lines: Vec<CartLine>) -> Vec<CartLine> {
    let mut seen = HashSet::new();
    let before = lines.len();
    let lines: Vec<CartLine> = lines
        .into_iter()
        .filter(|l| seen.insert(l.product.id.clone()))
        .collect();

    if lines.len() != before {
        tracing::warn!(dropped = before - lines.len(), "duplicate cart lines dropped");
    }
    lines
}
