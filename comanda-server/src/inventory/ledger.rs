//! Stock reservation and release
//!
//! Stock is decremented when items are ordered and returned when items are
//! decremented, removed or refunded. Every call runs inside the command's
//! write transaction, next to the line item change that motivates it.

use std::collections::BTreeMap;

use shared::models::Product;
use shared::order::OrderItemInput;

use crate::orders::traits::{CommandContext, OrderError};

/// Maximum quantity per input line
pub const MAX_QUANTITY: u32 = 9999;

/// Take `quantity` units out of a product, all or nothing
pub fn reserve(product: &mut Product, quantity: u32) -> Result<(), OrderError> {
    if product.stock < quantity {
        return Err(OrderError::InsufficientStock {
            product: product.name.clone(),
            requested: quantity as u64,
            available: product.stock,
        });
    }
    product.stock -= quantity;
    Ok(())
}

/// Return `quantity` units to a product
///
/// Callers release exactly what they reserved earlier; over-release is not
/// detected here.
pub fn release(product: &mut Product, quantity: u32) {
    product.stock = product.stock.saturating_add(quantity);
}

/// Validate the shape of input lines (no catalog access)
pub fn validate_lines(items: &[OrderItemInput]) -> Result<(), OrderError> {
    if items.is_empty() {
        return Err(OrderError::InvalidInput("at least one item is required".to_string()));
    }
    for item in items {
        if item.quantity == 0 {
            return Err(OrderError::InvalidInput(format!(
                "quantity must be positive (product {})",
                item.product_id
            )));
        }
        if item.quantity > MAX_QUANTITY {
            return Err(OrderError::InvalidInput(format!(
                "quantity exceeds maximum allowed ({}), got {}",
                MAX_QUANTITY, item.quantity
            )));
        }
    }
    Ok(())
}

/// Products touched by a set of input lines, with the aggregated demand
///
/// Built before anything is written: a plan only exists when every product
/// is orderable and has enough stock for the sum of its lines.
#[derive(Debug)]
pub struct ReservationPlan {
    demand: BTreeMap<i64, (Product, u64)>,
}

impl ReservationPlan {
    pub fn build(ctx: &CommandContext<'_>, items: &[OrderItemInput]) -> Result<Self, OrderError> {
        validate_lines(items)?;

        let mut demand: BTreeMap<i64, (Product, u64)> = BTreeMap::new();
        for item in items {
            if let Some((_, requested)) = demand.get_mut(&item.product_id) {
                *requested += item.quantity as u64;
                continue;
            }
            let product = ctx.load_product(item.product_id)?;
            if !product.is_orderable() {
                return Err(OrderError::ProductUnavailable(product.name));
            }
            demand.insert(item.product_id, (product, item.quantity as u64));
        }

        for (product, requested) in demand.values() {
            if (product.stock as u64) < *requested {
                return Err(OrderError::InsufficientStock {
                    product: product.name.clone(),
                    requested: *requested,
                    available: product.stock,
                });
            }
        }

        Ok(Self { demand })
    }

    /// Catalog row as read when the plan was built (price and name snapshot)
    pub fn product(&self, product_id: i64) -> Option<&Product> {
        self.demand.get(&product_id).map(|(product, _)| product)
    }

    /// Write the reservations
    pub fn commit(self, ctx: &CommandContext<'_>) -> Result<(), OrderError> {
        let now = ctx.now();
        for (_, (mut product, requested)) in self.demand {
            // checked in build(), requested <= stock <= u32::MAX
            reserve(&mut product, requested as u32)?;
            product.updated_at = now;
            ctx.save_product(&product)?;
            tracing::debug!(product_id = product.id, reserved = requested, stock = product.stock, "Stock reserved");
        }
        Ok(())
    }
}

/// Return units of one product to stock
pub fn release_units(
    ctx: &CommandContext<'_>,
    product_id: i64,
    quantity: u32,
) -> Result<Product, OrderError> {
    let mut product = ctx.load_product(product_id)?;
    release(&mut product, quantity);
    product.updated_at = ctx.now();
    ctx.save_product(&product)?;
    tracing::debug!(product_id, released = quantity, stock = product.stock, "Stock released");
    Ok(product)
}

/// Manual correction; a result below zero is rejected
pub fn adjust(product: &mut Product, delta: i64) -> Result<(), OrderError> {
    let next = product.stock as i64 + delta;
    if next < 0 {
        return Err(OrderError::InsufficientStock {
            product: product.name.clone(),
            requested: delta.unsigned_abs(),
            available: product.stock,
        });
    }
    product.stock = u32::try_from(next)
        .map_err(|_| OrderError::InvalidInput(format!("stock would overflow: {}", next)))?;
    Ok(())
}
