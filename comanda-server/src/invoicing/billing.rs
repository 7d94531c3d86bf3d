//! Invoice arithmetic and payment rules
//!
//! All amounts are `Decimal`. Derived values (discount, tax) are rounded to
//! 2 decimal places, half-up.

use rust_decimal::prelude::*;
use shared::models::{CustomerInfo, Invoice, PaymentStatus};
use shared::order::Order;

use crate::orders::traits::OrderError;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum accepted payment amount
const MAX_PAYMENT_AMOUNT: Decimal = Decimal::from_parts(1_000_000, 0, 0, false, 0);

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Discount percentage must lie in [0, 100]
pub fn validate_discount_percent(percent: Decimal) -> Result<(), OrderError> {
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(OrderError::InvalidInput(format!(
            "discount_percent must be between 0 and 100, got {}",
            percent
        )));
    }
    Ok(())
}

/// Payment and refund amounts must be positive and bounded
pub fn validate_amount(amount: Decimal) -> Result<(), OrderError> {
    if amount <= Decimal::ZERO || amount > MAX_PAYMENT_AMOUNT {
        return Err(OrderError::InvalidAmount(amount));
    }
    Ok(())
}

/// Derived invoice totals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// discount = subtotal × pct / 100, tax = (subtotal − discount) × rate
pub fn compute_totals(subtotal: Decimal, discount_percent: Decimal, tax_rate: Decimal) -> InvoiceTotals {
    let discount = round_money(subtotal * discount_percent / Decimal::ONE_HUNDRED);
    let tax = round_money((subtotal - discount) * tax_rate);
    InvoiceTotals {
        subtotal,
        discount,
        tax,
        total: subtotal - discount + tax,
    }
}

/// Re-derive an invoice from a new subtotal, keeping its discount percent
/// and tax rate
pub fn apply_subtotal(invoice: &mut Invoice, subtotal: Decimal, now: i64) {
    let totals = compute_totals(subtotal, invoice.discount_percent, invoice.tax_rate);
    invoice.subtotal = totals.subtotal;
    invoice.discount = totals.discount;
    invoice.tax = totals.tax;
    invoice.total = totals.total;
    invoice.updated_at = now;
}

/// Build a fresh UNPAID invoice for an order
pub fn new_invoice(
    invoice_id: i64,
    order: &Order,
    discount_percent: Decimal,
    tax_rate: Decimal,
    customer: CustomerInfo,
    now: i64,
) -> Invoice {
    let totals = compute_totals(order.items_total(), discount_percent, tax_rate);
    Invoice {
        id: invoice_id,
        number: shared::util::invoice_number(invoice_id),
        order_id: order.id,
        subtotal: totals.subtotal,
        discount_percent,
        discount: totals.discount,
        tax_rate,
        tax: totals.tax,
        total: totals.total,
        payment_status: PaymentStatus::Unpaid,
        payment_method: None,
        amount_tendered: None,
        change_given: None,
        customer,
        notes: None,
        refund_amount: None,
        refund_reason: None,
        created_at: now,
        paid_at: None,
        refunded_at: None,
        updated_at: now,
    }
}

/// Outcome of comparing a payment against the invoice total
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settlement {
    pub change: Decimal,
    pub shortfall: Decimal,
    pub status: PaymentStatus,
}

pub fn settle(total: Decimal, amount: Decimal) -> Settlement {
    if amount >= total {
        Settlement {
            change: amount - total,
            shortfall: Decimal::ZERO,
            status: PaymentStatus::Paid,
        }
    } else {
        Settlement {
            change: Decimal::ZERO,
            shortfall: total - amount,
            status: PaymentStatus::Partial,
        }
    }
}

/// Units to return to stock for one product on refund
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestockLine {
    pub product_id: i64,
    pub quantity: u32,
}

/// Stock returned when an invoice is refunded
///
/// Every line item's full quantity is returned, whatever the refunded
/// amount. Partial refunds restock everything.
pub fn refund_restock_plan(order: &Order, _refund_amount: Decimal) -> Vec<RestockLine> {
    order
        .items
        .iter()
        .filter(|item| item.quantity > 0)
        .map(|item| RestockLine {
            product_id: item.product_id,
            quantity: item.quantity,
        })
        .collect()
}
