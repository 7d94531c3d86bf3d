//! PayInvoice command handler
//!
//! Records a payment (bookkeeping only). Paying at least the total settles
//! the invoice and frees the order's table; less leaves it PARTIAL.

use crate::invoicing;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use rust_decimal::Decimal;
use shared::models::{PaymentMethod, PaymentStatus};
use shared::order::{CommandOutcome, EventPayload, PaymentResult};

/// PayInvoice action
#[derive(Debug, Clone)]
pub struct PayInvoiceAction {
    pub invoice_id: i64,
    pub method: PaymentMethod,
    pub amount: Decimal,
    pub note: Option<String>,
}

impl CommandHandler for PayInvoiceAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        let mut invoice = ctx.load_invoice(self.invoice_id)?;
        match invoice.payment_status {
            PaymentStatus::Paid => return Err(OrderError::AlreadyPaid(invoice.id)),
            PaymentStatus::Refunded => return Err(OrderError::InvoiceRefunded(invoice.id)),
            PaymentStatus::Unpaid | PaymentStatus::Partial => {}
        }
        invoicing::validate_amount(self.amount)?;

        let now = ctx.now();
        let settlement = invoicing::settle(invoice.total, self.amount);
        invoice.payment_status = settlement.status;
        invoice.payment_method = Some(self.method);
        invoice.amount_tendered = Some(self.amount);
        invoice.change_given = Some(settlement.change);
        if settlement.status == PaymentStatus::Paid {
            invoice.paid_at = Some(now);
        }
        if let Some(note) = &self.note {
            invoice.append_note(note);
        }
        invoice.updated_at = now;
        ctx.save_invoice(&invoice)?;

        let table_freed = if settlement.status == PaymentStatus::Paid {
            let order = ctx.load_order(invoice.order_id)?;
            ctx.release_table(&order)?
        } else {
            false
        };

        ctx.emit(
            invoice.order_id,
            EventPayload::InvoicePaid {
                invoice_id: invoice.id,
                method: self.method,
                amount: self.amount,
                change: settlement.change,
                payment_status: settlement.status,
                table_freed,
            },
        );

        Ok(CommandOutcome::InvoicePaid(PaymentResult {
            invoice_id: invoice.id,
            order_id: invoice.order_id,
            method: self.method,
            total: invoice.total,
            amount: self.amount,
            change: settlement.change,
            shortfall: settlement.shortfall,
            payment_status: settlement.status,
            table_freed,
        }))
    }
}
