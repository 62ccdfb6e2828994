use serde::Serialize;

use crate::db_types::{Order, OrderItem};

/// An order together with its snapshot line items: the full receipt returned by checkout and the order detail
/// endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderWithItems {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        Self { order, items }
    }
}
