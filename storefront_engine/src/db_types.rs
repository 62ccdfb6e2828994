use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sfs_common::Money;
use sqlx::{FromRow, Type};
use thiserror::Error;

use crate::pricing;

//--------------------------------------      UserId       -----------------------------------------------------------
/// A lightweight wrapper around the opaque user identity resolved by the authentication layer.
///
/// The engine never interprets the contents; it is only used as an ownership key for carts and orders.
#[derive(Debug, Clone, Type, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Into<String>> From<S> for UserId {
    fn from(value: S) -> Self {
        Self(value.into())
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

//--------------------------------------       Role        -----------------------------------------------------------
/// Access roles carried in an access token. The engine trusts the resolution completely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A regular shopper. May operate on their own cart and orders.
    User,
    /// A storefront administrator. May manage products, read all orders and advance fulfilment status.
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(pub String);

//--------------------------------------      Product      -----------------------------------------------------------
/// A catalog product record.
///
/// `price` is the undiscounted base price; `discount` is a whole percentage in `[0, 100]`. The stock count is
/// informational to the order flow (see the `decrement_stock` checkout policy).
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub price: Money,
    pub discount: i64,
    pub image: Option<String>,
    pub stock: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The per-unit price after the discount percentage is applied, rounded to whole cents.
    pub fn effective_price(&self) -> Money {
        pricing::effective_price(self.price, self.discount)
    }
}

/// The fields a new product is created from. Everything else is assigned by the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: String,
    pub price: Money,
    #[serde(default)]
    pub discount: i64,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_stock")]
    pub stock: i64,
}

fn default_stock() -> i64 {
    100
}

/// A partial product update. Only the fields that are set are written; `is_empty` updates are skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<Money>,
    pub discount: Option<i64>,
    pub image: Option<String>,
    pub stock: Option<i64>,
}

impl ProductUpdate {
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    pub fn with_discount(mut self, discount: i64) -> Self {
        self.discount = Some(discount);
        self
    }

    pub fn with_stock(mut self, stock: i64) -> Self {
        self.stock = Some(stock);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() &&
            self.description.is_none() &&
            self.category.is_none() &&
            self.price.is_none() &&
            self.discount.is_none() &&
            self.image.is_none() &&
            self.stock.is_none()
    }
}

//--------------------------------------       Cart        -----------------------------------------------------------
/// The per-user cart record. There is at most one per user (enforced by a uniqueness constraint); it is created
/// lazily on first access and survives checkouts. Only its lines come and go.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Cart {
    pub id: i64,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One (product, quantity) pairing inside a cart. Holds a weak reference to the product; prices are resolved
/// against the live catalog at read time.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize)]
pub struct CartLine {
    pub id: i64,
    pub cart_id: i64,
    pub product_id: i64,
    pub quantity: i64,
}

/// A cart line joined to the current catalog record for its product. This is the shape every cart operation
/// returns and the input the pricing engine works over.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ResolvedCartLine {
    #[sqlx(flatten)]
    pub product: Product,
    pub quantity: i64,
}

//--------------------------------------   CustomerInfo    -----------------------------------------------------------
/// Shipping and contact details captured at checkout and frozen into the order.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address1: String,
    #[serde(default)]
    pub address2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    pub zip: String,
    pub country: String,
}

//--------------------------------------  OrderStatusType  -----------------------------------------------------------
/// Fulfilment status of an order.
///
/// The legal transitions are:
///
/// | From \ To  | processing | shipped | delivered | cancelled |
/// |------------|------------|---------|-----------|-----------|
/// | pending    | ✓          | ✓       |           | ✓         |
/// | processing |            | ✓       |           | ✓         |
/// | shipped    |            |         | ✓         | ✓         |
///
/// `delivered` and `cancelled` are terminal. Whether illegal transitions are rejected is a checkout-policy
/// decision (`strict_transitions`); the table itself lives here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order has been created. No payment verification takes place in this system.
    #[default]
    Pending,
    /// The order has been picked up for fulfilment.
    Processing,
    /// The order has left the warehouse.
    Shipped,
    /// The order has reached the customer. Entering this state stamps `delivered_at`.
    Delivered,
    /// The order has been cancelled by the customer or an admin.
    Cancelled,
}

impl OrderStatusType {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatusType::Delivered | OrderStatusType::Cancelled)
    }

    /// Whether moving from `self` to `next` is legal under the strict fulfilment state machine.
    pub fn can_transition_to(&self, next: OrderStatusType) -> bool {
        use OrderStatusType::*;
        match (self, next) {
            (Pending, Processing) | (Pending, Shipped) | (Pending, Cancelled) => true,
            (Processing, Shipped) | (Processing, Cancelled) => true,
            (Shipped, Delivered) | (Shipped, Cancelled) => true,
            _ => false,
        }
    }
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Pending => write!(f, "pending"),
            OrderStatusType::Processing => write!(f, "processing"),
            OrderStatusType::Shipped => write!(f, "shipped"),
            OrderStatusType::Delivered => write!(f, "delivered"),
            OrderStatusType::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------       Order       -----------------------------------------------------------
/// An order record: the immutable receipt produced by checkout.
///
/// Totals are computed once at creation and never recomputed. Apart from `status` (and the `delivered_at`
/// stamp that comes with it), nothing here changes after insertion.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Order {
    pub id: i64,
    pub user_id: UserId,
    #[sqlx(flatten)]
    pub customer: CustomerInfo,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub status: OrderStatusType,
    pub paid_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One purchased line within an order. A point-in-time copy of the product's title, price, discount and image,
/// deliberately sharing no representation with [`CartLine`]: the cart is live, the order is frozen.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub title: String,
    pub price: Money,
    pub discount: i64,
    pub image: Option<String>,
    pub quantity: i64,
}
