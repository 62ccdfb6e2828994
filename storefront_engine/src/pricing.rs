//! The pricing engine.
//!
//! Pure functions that turn a set of (price, discount, quantity) lines into the published
//! `{subtotal, tax, total}` figures. All arithmetic is integer arithmetic over cents; per-line contributions are
//! accumulated in hundredths of a cent so that rounding happens exactly once, at the aggregate boundary.
//!
//! There are no error conditions here. Inputs are validated (non-negative price, discount in `[0, 100]`,
//! quantity at least 1) before they reach this module.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sfs_common::Money;

/// The default tax rate applied at checkout: 10%, expressed in basis points.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1000;

/// A tax rate in basis points (1/100th of a percent). Carried in configuration rather than hard-coded at the
/// places tax is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    pub fn from_basis_points(bps: u32) -> Self {
        Self(bps)
    }

    pub fn basis_points(&self) -> u32 {
        self.0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        Self(DEFAULT_TAX_RATE_BPS)
    }
}

impl Display for TaxRate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 % 100 == 0 {
            write!(f, "{}%", self.0 / 100)
        } else {
            write!(f, "{:.2}%", self.0 as f64 / 100.0)
        }
    }
}

/// The aggregate figures for a set of lines. Subtotal and tax are each rounded to whole cents independently;
/// the total is their exact sum.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

/// The per-unit discounted price, rounded to whole cents. Used for display; aggregate totals are computed from
/// un-rounded contributions instead.
pub fn effective_price(price: Money, discount: i64) -> Money {
    Money::from_cents(round_div(price.cents() * (100 - discount), 100))
}

/// A line's contribution to the subtotal, in hundredths of a cent (not yet rounded).
pub fn line_contribution(price: Money, discount: i64, quantity: i64) -> i64 {
    price.cents() * (100 - discount) * quantity
}

/// Computes `{subtotal, tax, total}` over `(price, discount, quantity)` lines.
///
/// An empty line set yields all-zero totals.
pub fn cart_totals<I>(lines: I, tax_rate: TaxRate) -> CartTotals
where I: IntoIterator<Item = (Money, i64, i64)> {
    let contributions: i64 = lines.into_iter().map(|(price, discount, qty)| line_contribution(price, discount, qty)).sum();
    let subtotal = round_div(contributions, 100);
    let tax = round_div(subtotal * i64::from(tax_rate.basis_points()), 10_000);
    CartTotals {
        subtotal: Money::from_cents(subtotal),
        tax: Money::from_cents(tax),
        total: Money::from_cents(subtotal + tax),
    }
}

/// Integer division with half-up rounding. Only defined over non-negative numerators, which is all the pricing
/// engine ever produces.
fn round_div(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator / 2) / denominator
}
