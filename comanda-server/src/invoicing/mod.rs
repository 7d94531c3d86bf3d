//! Invoice lifecycle rules

pub mod billing;

pub use billing::{
    InvoiceTotals, RestockLine, Settlement, apply_subtotal, compute_totals, new_invoice,
    refund_restock_plan, round_money, settle, validate_amount, validate_discount_percent,
};
