//! Invoice Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Invoice payment state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    #[default]
    Unpaid,
    Partial,
    Paid,
    Refunded,
}

impl PaymentStatus {
    /// Unpaid or partially paid: the order may still be amended
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Unpaid | Self::Partial)
    }
}

/// Payment method recorded on settlement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    Transfer,
    Digital,
    Mixed,
}

/// Optional customer fields printed on the invoice
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CustomerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Invoice entity (one per order)
///
/// `subtotal`, `discount`, `tax` and `total` are derived from the order's line
/// items, `discount_percent` and `tax_rate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: i64,
    /// `FAC-000001`
    pub number: String,
    pub order_id: i64,
    pub subtotal: Decimal,
    /// Discount percentage in [0, 100]
    pub discount_percent: Decimal,
    pub discount: Decimal,
    /// Tax rate as a fraction (0.19 = 19%)
    pub tax_rate: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    /// Amount handed over in the last payment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_tendered: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change_given: Option<Decimal>,
    #[serde(default)]
    pub customer: CustomerInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_reason: Option<String>,
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refunded_at: Option<i64>,
    pub updated_at: i64,
}

impl Invoice {
    /// Append a line to the free-text notes
    pub fn append_note(&mut self, note: &str) {
        let note = note.trim();
        if note.is_empty() {
            return;
        }
        match &mut self.notes {
            Some(existing) if !existing.is_empty() => {
                existing.push('\n');
                existing.push_str(note);
            }
            _ => self.notes = Some(note.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoice() -> Invoice {
        Invoice {
            id: 1,
            number: "FAC-000001".to_string(),
            order_id: 1,
            subtotal: Decimal::new(1000, 2),
            discount_percent: Decimal::ZERO,
            discount: Decimal::ZERO,
            tax_rate: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::new(1000, 2),
            payment_status: PaymentStatus::Unpaid,
            payment_method: None,
            amount_tendered: None,
            change_given: None,
            customer: CustomerInfo::default(),
            notes: None,
            refund_amount: None,
            refund_reason: None,
            created_at: 0,
            paid_at: None,
            refunded_at: None,
            updated_at: 0,
        }
    }

    #[test]
    fn test_pending_states() {
        assert!(PaymentStatus::Unpaid.is_pending());
        assert!(PaymentStatus::Partial.is_pending());
        assert!(!PaymentStatus::Paid.is_pending());
        assert!(!PaymentStatus::Refunded.is_pending());
    }

    #[test]
    fn test_append_note() {
        let mut inv = invoice();
        inv.append_note("  ");
        assert!(inv.notes.is_none());
        inv.append_note("first");
        inv.append_note("second");
        assert_eq!(inv.notes.as_deref(), Some("first\nsecond"));
    }

    #[test]
    fn test_payment_method_wire_names() {
        let json = serde_json::to_string(&PaymentMethod::CreditCard).unwrap();
        assert_eq!(json, "\"CREDIT_CARD\"");
        assert!(serde_json::from_str::<PaymentMethod>("\"BITCOIN\"").is_err());
    }
}
