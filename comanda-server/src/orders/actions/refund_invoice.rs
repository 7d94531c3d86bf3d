//! RefundInvoice command handler
//!
//! Only a PAID invoice may be refunded. The amount defaults to the total and
//! never exceeds it; stock is returned through `refund_restock_plan`.

use crate::inventory;
use crate::invoicing;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use rust_decimal::Decimal;
use shared::models::PaymentStatus;
use shared::order::{CommandOutcome, EventPayload, RefundResult};

/// RefundInvoice action
#[derive(Debug, Clone)]
pub struct RefundInvoiceAction {
    pub invoice_id: i64,
    pub reason: String,
    pub amount: Option<Decimal>,
}

impl CommandHandler for RefundInvoiceAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(OrderError::InvalidInput("refund reason is required".to_string()));
        }

        let mut invoice = ctx.load_invoice(self.invoice_id)?;
        if invoice.payment_status != PaymentStatus::Paid {
            return Err(OrderError::NotPaid(invoice.id));
        }

        let amount = self.amount.unwrap_or(invoice.total);
        if amount <= Decimal::ZERO {
            return Err(OrderError::InvalidAmount(amount));
        }
        if amount > invoice.total {
            return Err(OrderError::AmountExceedsTotal {
                amount,
                total: invoice.total,
            });
        }

        // Return stock
        let order = ctx.load_order(invoice.order_id)?;
        let mut restocked_units = 0u32;
        for line in invoicing::refund_restock_plan(&order, amount) {
            inventory::release_units(ctx, line.product_id, line.quantity)?;
            restocked_units = restocked_units.saturating_add(line.quantity);
        }

        let now = ctx.now();
        invoice.payment_status = PaymentStatus::Refunded;
        invoice.refund_amount = Some(amount);
        invoice.refund_reason = Some(reason.to_string());
        invoice.refunded_at = Some(now);
        invoice.append_note(reason);
        invoice.updated_at = now;
        ctx.save_invoice(&invoice)?;

        tracing::info!(invoice_id = invoice.id, %amount, restocked_units, "Invoice refunded");
        ctx.emit(
            invoice.order_id,
            EventPayload::InvoiceRefunded {
                invoice_id: invoice.id,
                amount,
                reason: reason.to_string(),
                restocked_units,
            },
        );

        Ok(CommandOutcome::InvoiceRefunded(RefundResult {
            invoice_id: invoice.id,
            order_id: invoice.order_id,
            refunded_amount: amount,
            restocked_units,
        }))
    }
}
