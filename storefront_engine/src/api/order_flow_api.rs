use std::fmt::Debug;

use log::*;

use crate::{
    api::order_objects::OrderWithItems,
    db_types::{CustomerInfo, Order, OrderStatusType, UserId},
    events::{EventProducers, OrderCreatedEvent, OrderStatusChangedEvent},
    pricing::TaxRate,
    traits::{CheckoutApiError, OrderApiError, StorefrontDatabase},
};

/// Policy knobs for the order flow. Behaviours that differ between deployments live here as explicit
/// configuration instead of hard-coded guesses.
#[derive(Debug, Clone, Copy)]
pub struct CheckoutConfig {
    /// The tax rate applied at the aggregate boundary.
    pub tax_rate: TaxRate,
    /// When true, checkout reduces each product's stock by the purchased quantity. The observed system never
    /// decremented stock, so this defaults to off.
    pub decrement_stock: bool,
    /// When true, fulfilment status changes must follow the legal transition table; when false, any status can
    /// be set to any other (the observed behavior).
    pub strict_transitions: bool,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self { tax_rate: TaxRate::default(), decrement_stock: false, strict_transitions: true }
    }
}

/// `OrderFlowApi` is the primary API for the checkout transaction and the order lifecycle that follows it.
pub struct OrderFlowApi<B> {
    db: B,
    config: CheckoutConfig,
    producers: EventProducers,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B, config: CheckoutConfig, producers: EventProducers) -> Self {
        Self { db, config, producers }
    }
}

impl<B> OrderFlowApi<B>
where B: StorefrontDatabase
{
    /// Converts the user's cart into an order.
    ///
    /// The heavy lifting happens inside [`StorefrontDatabase::place_order`], which runs the snapshot, totals,
    /// insert and cart-clear as one transaction. An empty (or absent) cart is refused; no empty orders are ever
    /// created. On success the `OrderCreatedEvent` hook fires and the full receipt is returned.
    pub async fn checkout(&self, user_id: &UserId, customer: CustomerInfo) -> Result<OrderWithItems, CheckoutApiError> {
        let (order, items) =
            self.db.place_order(user_id, customer, self.config.tax_rate, self.config.decrement_stock).await?;
        debug!("🔄️📦️ Order #{} placed by {user_id}. {} line(s), total {}", order.id, items.len(), order.total);
        for producer in &self.producers.order_created_producers {
            let event = OrderCreatedEvent::new(order.clone(), items.clone());
            producer.publish_event(event).await;
        }
        Ok(OrderWithItems::new(order, items))
    }

    /// Fetches one order with its items, or `None`.
    pub async fn order_details(&self, order_id: i64) -> Result<Option<OrderWithItems>, OrderApiError> {
        let Some(order) = self.db.fetch_order(order_id).await? else {
            return Ok(None);
        };
        let items = self.db.fetch_order_items(order.id).await?;
        Ok(Some(OrderWithItems::new(order, items)))
    }

    /// All orders belonging to the user, newest first, each with its items.
    pub async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<OrderWithItems>, OrderApiError> {
        let orders = self.db.fetch_orders_for_user(user_id).await?;
        self.with_items(orders).await
    }

    /// Every order in the store, newest first, each with its items. Admin listing.
    pub async fn all_orders(&self) -> Result<Vec<OrderWithItems>, OrderApiError> {
        let orders = self.db.fetch_all_orders().await?;
        self.with_items(orders).await
    }

    async fn with_items(&self, orders: Vec<Order>) -> Result<Vec<OrderWithItems>, OrderApiError> {
        let mut result = Vec::with_capacity(orders.len());
        for order in orders {
            let items = self.db.fetch_order_items(order.id).await?;
            result.push(OrderWithItems::new(order, items));
        }
        Ok(result)
    }

    /// Advances the order's fulfilment status.
    ///
    /// Under `strict_transitions` the move must be legal per the [`OrderStatusType`] table; otherwise any
    /// status can be written. Entering `delivered` stamps `delivered_at`. The status-changed hook fires after
    /// the write commits.
    pub async fn update_status(&self, order_id: i64, new_status: OrderStatusType) -> Result<Order, OrderApiError> {
        let order = self.db.fetch_order(order_id).await?.ok_or(OrderApiError::OrderNotFound)?;
        let old_status = order.status;
        if self.config.strict_transitions && !old_status.can_transition_to(new_status) {
            debug!("🔄️📦️ Rejecting illegal status change {old_status} -> {new_status} on order #{order_id}");
            return Err(OrderApiError::InvalidTransition { from: old_status, to: new_status });
        }
        let updated = self.db.set_order_status(order_id, new_status).await?;
        debug!("🔄️📦️ Order #{order_id} moved from {old_status} to {new_status}");
        for producer in &self.producers.status_changed_producers {
            let event = OrderStatusChangedEvent::new(updated.clone(), old_status);
            producer.publish_event(event).await;
        }
        Ok(updated)
    }
}
