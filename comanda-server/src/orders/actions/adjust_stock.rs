//! AdjustStock command handler
//!
//! Manual stock correction. Audit events are filed under order id 0.

use crate::inventory;
use crate::orders::traits::{CommandContext, CommandHandler, CommandMetadata, OrderError};
use shared::order::{CommandOutcome, EventPayload};

/// AdjustStock action
#[derive(Debug, Clone)]
pub struct AdjustStockAction {
    pub product_id: i64,
    pub delta: i64,
    pub reason: Option<String>,
}

impl CommandHandler for AdjustStockAction {
    fn execute(
        &self,
        ctx: &mut CommandContext<'_>,
        _metadata: &CommandMetadata,
    ) -> Result<CommandOutcome, OrderError> {
        if self.delta == 0 {
            return Err(OrderError::InvalidInput("delta must not be zero".to_string()));
        }
        let mut product = ctx.load_product(self.product_id)?;
        inventory::adjust(&mut product, self.delta)?;
        product.updated_at = ctx.now();
        ctx.save_product(&product)?;

        ctx.emit(
            0,
            EventPayload::StockAdjusted {
                product_id: product.id,
                delta: self.delta,
                stock: product.stock,
                reason: self.reason.clone(),
            },
        );

        Ok(CommandOutcome::StockAdjusted {
            product_id: product.id,
            stock: product.stock,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    fn adjust(delta: i64) -> AdjustStockAction {
        AdjustStockAction {
            product_id: 2,
            delta,
            reason: Some("delivery".to_string()),
        }
    }

    #[test]
    fn test_adjust_stock() {
        let storage = seeded_storage();
        let outcome = run(&storage, &adjust(7)).unwrap();
        assert_eq!(
            outcome,
            CommandOutcome::StockAdjusted {
                product_id: 2,
                stock: 10
            }
        );

        let err = run(&storage, &adjust(-11)).unwrap_err();
        assert!(matches!(err, OrderError::InsufficientStock { .. }));
        assert_eq!(storage.get_product(2).unwrap().unwrap().stock, 10);

        assert!(matches!(
            run(&storage, &adjust(0)).unwrap_err(),
            OrderError::InvalidInput(_)
        ));
    }
}
