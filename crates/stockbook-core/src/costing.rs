//! # Weighted-Average Costing
//!
//! The unit purchase cost of a product is a running weighted average of the
//! stock it already holds and the stock coming in.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Weighted-Average Cost Basis                         │
//! │                                                                         │
//! │              old_cost × old_stock + incoming_cost × incoming_qty       │
//! │   new_cost = ───────────────────────────────────────────────────       │
//! │                         old_stock + incoming_qty                        │
//! │                                                                         │
//! │   Example: 10 @ 20.00 on hand, receive 10 @ 30.00 → 20 @ 25.00         │
//! │                                                                         │
//! │   Two fallbacks when the formula does not apply:                       │
//! │   ┌──────────────────────┬─────────────────────────────────────────┐   │
//! │   │ restock via upsert   │ incoming ≤ 0 or total ≤ 0 → keep old    │   │
//! │   │ posted purchase      │ total ≤ 0 → take incoming cost verbatim │   │
//! │   └──────────────────────┴─────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Costs are fractional cents (`f64`): incoming costs are whole cents, the
//! average of them generally is not. Stock may be negative after an oversell;
//! the formula is applied as-is in that case, negative weight included.

/// Cost basis after restocking through a product upsert.
///
/// ## Arguments
/// * `old_stock` - Units on hand before the restock
/// * `old_cost` - Current unit cost basis (fractional cents)
/// * `incoming_stock` - Units added by the upsert (may be 0)
/// * `incoming_cost_cents` - Unit cost of the added units
///
/// Keeps `old_cost` unless units are actually added and the resulting stock
/// is positive.
pub fn cost_after_restock(
    old_stock: i64,
    old_cost: f64,
    incoming_stock: i64,
    incoming_cost_cents: i64,
) -> f64 {
    let new_stock = old_stock.saturating_add(incoming_stock);
    if incoming_stock > 0 && new_stock > 0 {
        weighted_average(old_stock, old_cost, incoming_stock, incoming_cost_cents, new_stock)
    } else {
        old_cost
    }
}

/// Cost basis after a posted purchase.
///
/// Falls back to the purchase's own unit cost when the resulting stock is
/// zero or negative (a purchase that only partially covers an oversell).
pub fn cost_after_purchase(
    old_stock: i64,
    old_cost: f64,
    quantity: i64,
    unit_cost_cents: i64,
) -> f64 {
    let total = old_stock.saturating_add(quantity);
    if total > 0 {
        weighted_average(old_stock, old_cost, quantity, unit_cost_cents, total)
    } else {
        unit_cost_cents as f64
    }
}

#[inline]
fn weighted_average(
    old_stock: i64,
    old_cost: f64,
    incoming_qty: i64,
    incoming_cost_cents: i64,
    total: i64,
) -> f64 {
    (old_cost * old_stock as f64 + incoming_cost_cents as f64 * incoming_qty as f64) / total as f64
}

// =============================================================================
// Unit Tests
// =============================================================================
