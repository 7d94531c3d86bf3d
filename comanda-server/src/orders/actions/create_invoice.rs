//! CreateInvoice command handler
//!
//! Explicit invoice creation with a discount percentage, optional tax and
//! customer fields. An order holds at most one invoice.

use crate::invoicing;
use crate::orders::storage::IdKind;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use rust_decimal::Decimal;
use shared::models::CustomerInfo;
use shared::order::{CommandOutcome, EventPayload, OrderStatus};

/// CreateInvoice action
#[derive(Debug, Clone)]
pub struct CreateInvoiceAction {
    pub order_id: i64,
    pub discount_percent: Decimal,
    /// Tax rate as a fraction, zero when tax was not requested
    pub tax_rate: Decimal,
    pub customer: CustomerInfo,
}

impl CommandHandler for CreateInvoiceAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        invoicing::validate_discount_percent(self.discount_percent)?;

        let order = ctx.load_order(self.order_id)?;
        if !matches!(order.status, OrderStatus::Ready | OrderStatus::Served) {
            return Err(OrderError::NotReady {
                order_id: order.id,
                status: order.status,
            });
        }
        if ctx.invoice_for_order(order.id)?.is_some() {
            return Err(OrderError::InvoiceExists(order.id));
        }

        let invoice_id = ctx.next_id(IdKind::Invoice)?;
        let invoice = invoicing::new_invoice(
            invoice_id,
            &order,
            self.discount_percent,
            self.tax_rate,
            self.customer.clone(),
            ctx.now(),
        );
        ctx.save_invoice(&invoice)?;
        ctx.emit(
            order.id,
            EventPayload::InvoiceCreated {
                invoice_id: invoice.id,
                invoice_number: invoice.number.clone(),
                total: invoice.total,
            },
        );

        Ok(CommandOutcome::InvoiceCreated {
            order_id: order.id,
            invoice_id: invoice.id,
            invoice_number: invoice.number,
            total: invoice.total,
        })
    }
}
