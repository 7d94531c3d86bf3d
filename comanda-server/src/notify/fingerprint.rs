//! Deterministic digests over kitchen and stock state

use sha2::{Digest, Sha256};
use shared::models::Product;
use shared::order::Order;

/// Digest over kitchen-relevant orders
///
/// Orders are taken in id order, items in creation order. Each order renders
/// as `order_id:STATE` followed by `:item_id:STATE:qty` per line item, and
/// orders are joined by `|`.
pub fn kitchen_digest(orders: &[Order]) -> String {
    let mut sorted: Vec<&Order> = orders.iter().filter(|o| o.status.is_active()).collect();
    sorted.sort_by_key(|o| o.id);

    let rendered: Vec<String> = sorted
        .into_iter()
        .map(|order| {
            let mut part = format!("{}:{}", order.id, order.status);
            for item in &order.items {
                part.push_str(&format!(":{}:{}:{}", item.id, item.status, item.quantity));
            }
            part
        })
        .collect();
    hash(&rendered.join("|"))
}

/// Digest over active products' stock levels (`id:stock`, id order)
pub fn stock_digest(products: &[Product]) -> String {
    let mut sorted: Vec<&Product> = products.iter().filter(|p| p.is_active).collect();
    sorted.sort_by_key(|p| p.id);

    let rendered: Vec<String> = sorted
        .into_iter()
        .map(|p| format!("{}:{}", p.id, p.stock))
        .collect();
    hash(&rendered.join("|"))
}

fn hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}
