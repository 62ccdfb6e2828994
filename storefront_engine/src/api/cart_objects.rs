use serde::Serialize;
use sfs_common::Money;

use crate::{db_types::ResolvedCartLine, pricing::CartTotals};

/// The one response shape every cart operation returns: the resolved lines plus the pricing engine's totals.
/// Mutating endpoints and the plain read return exactly the same thing, so clients never need a second fetch.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<ResolvedCartLine>,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl CartView {
    pub fn new(items: Vec<ResolvedCartLine>, totals: CartTotals) -> Self {
        Self { items, subtotal: totals.subtotal, tax: totals.tax, total: totals.total }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
