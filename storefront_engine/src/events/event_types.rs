use crate::db_types::{Order, OrderItem, OrderStatusType};

/// Emitted after a checkout transaction commits. Carries the full receipt.
#[derive(Debug, Clone)]
pub struct OrderCreatedEvent {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderCreatedEvent {
    pub fn new(order: Order, items: Vec<OrderItem>) -> Self {
        Self { order, items }
    }
}

/// Emitted after an admin advances an order's fulfilment status.
#[derive(Debug, Clone)]
pub struct OrderStatusChangedEvent {
    pub order: Order,
    pub old_status: OrderStatusType,
    pub new_status: OrderStatusType,
}

impl OrderStatusChangedEvent {
    pub fn new(order: Order, old_status: OrderStatusType) -> Self {
        let new_status = order.status;
        Self { order, old_status, new_status }
    }
}
