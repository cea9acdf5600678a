use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{OrderRequest, StockCheck, StockLevel};

/// Reasons an order is refused. `Display` is the exact message sent to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("ProductId is required.")]
    Validation,
    #[error("Insufficient stock.")]
    InsufficientStock,
}

/// Authoritative stock counts, one atomic counter per product.
///
/// The product set is fixed at construction, so the map itself is never
/// mutated afterwards and can be shared behind an `Arc` without a lock.
/// Only the counters change:
///
/// - `check_stock` is a single load and may observe a value that an order
///   changes a moment later. It is advisory.
/// - `create_order` runs its check and decrement as one compare-and-swap, so
///   two orders can never both spend the same units.
#[derive(Debug)]
pub struct Ledger {
    stock: HashMap<String, AtomicI64>,
}

impl Ledger {
    pub fn new<I, S>(catalog: I) -> Self
    where
        I: IntoIterator<Item = (S, i64)>,
        S: Into<String>,
    {
        let stock = catalog
            .into_iter()
            .map(|(id, qty)| (id.into(), AtomicI64::new(qty)))
            .collect();
        Self { stock }
    }

    pub fn check_stock(&self, product_id: &str, quantity: i64) -> StockCheck {
        let available = self
            .stock
            .get(product_id)
            .map(|counter| counter.load(Ordering::Acquire) >= quantity)
            .unwrap_or(false);

        debug!(product_id, quantity, available, "Checked stock");

        StockCheck {
            product_id: product_id.to_string(),
            available,
        }
    }

    /// Place an order, decrementing stock on success only.
    ///
    /// Quantities are not required to be positive: a zero or negative quantity
    /// passes the comparison and a negative one adds stock back.
    pub fn create_order(&self, order: &OrderRequest) -> Result<(), LedgerError> {
        if order.product_id.is_empty() {
            warn!(quantity = order.quantity, "Rejected order without product id");
            return Err(LedgerError::Validation);
        }

        let Some(counter) = self.stock.get(&order.product_id) else {
            warn!(product_id = %order.product_id, "Rejected order for unknown product");
            return Err(LedgerError::InsufficientStock);
        };

        let result = counter.fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
            if current >= order.quantity {
                current.checked_sub(order.quantity)
            } else {
                None
            }
        });

        match result {
            Ok(previous) => {
                info!(
                    product_id = %order.product_id,
                    quantity = order.quantity,
                    remaining = previous - order.quantity,
                    "Order created"
                );
                Ok(())
            }
            Err(current) => {
                warn!(
                    product_id = %order.product_id,
                    quantity = order.quantity,
                    remaining = current,
                    "Rejected order: insufficient stock"
                );
                Err(LedgerError::InsufficientStock)
            }
        }
    }

    pub fn stock_of(&self, product_id: &str) -> Option<i64> {
        self.stock
            .get(product_id)
            .map(|counter| counter.load(Ordering::Acquire))
    }

    /// Current level of every product, sorted by id.
    pub fn snapshot(&self) -> Vec<StockLevel> {
        let mut levels: Vec<StockLevel> = self
            .stock
            .iter()
            .map(|(id, counter)| StockLevel {
                product_id: id.clone(),
                quantity: counter.load(Ordering::Acquire),
            })
            .collect();
        levels.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        levels
    }

    pub fn product_count(&self) -> usize {
        self.stock.len()
    }
}
