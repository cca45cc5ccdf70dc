//! Document kinds, statuses, and line-item arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The three document families an organization issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// A customer invoice.
    Invoice,
    /// A purchase order.
    PurchaseOrder,
    /// A payment receipt (kwitansi).
    Receipt,
}

impl DocumentKind {
    /// Parses a kind from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "invoice" => Some(Self::Invoice),
            "purchase_order" => Some(Self::PurchaseOrder),
            "receipt" => Some(Self::Receipt),
            _ => None,
        }
    }

    /// Returns the wire representation of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Invoice => "invoice",
            Self::PurchaseOrder => "purchase_order",
            Self::Receipt => "receipt",
        }
    }

    /// Whether this kind carries a due date (receipts do not).
    #[must_use]
    pub const fn has_due_date(self) -> bool {
        !matches!(self, Self::Receipt)
    }
}

/// Document status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Not yet sent to the customer.
    Draft,
    /// Sent, awaiting payment.
    Sent,
    /// Payment received.
    Paid,
    /// Past the due date without payment. Only the sweep sets this.
    Overdue,
    /// Abandoned.
    Cancelled,
}

impl DocumentStatus {
    /// Parses a status from its wire representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "sent" => Some(Self::Sent),
            "paid" => Some(Self::Paid),
            "overdue" => Some(Self::Overdue),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    /// Returns the wire representation of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Sent => "sent",
            Self::Paid => "paid",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a document in this status is still awaiting settlement.
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Draft | Self::Sent)
    }

    /// Whether clients may request a transition to this status directly.
    /// `overdue` is reserved for the sweep.
    #[must_use]
    pub const fn is_client_settable(self) -> bool {
        !matches!(self, Self::Overdue)
    }
}

/// A single denormalized line item on a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// What is being billed.
    pub description: String,
    /// Quantity.
    pub quantity: Decimal,
    /// Price per unit.
    pub unit_price: Decimal,
}

impl LineItem {
    /// The line amount: quantity times unit price.
    #[must_use]
    pub fn amount(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Computed document totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentTotals {
    /// Sum of line amounts.
    pub subtotal: Decimal,
    /// Tax on the subtotal.
    pub tax: Decimal,
    /// Subtotal plus tax.
    pub total: Decimal,
}

/// Line item validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineItemError {
    /// A document must have at least one line item.
    #[error("a document requires at least one line item")]
    Empty,

    /// Line description is blank.
    #[error("line {0}: description must not be blank")]
    BlankDescription(usize),

    /// Quantity must be positive.
    #[error("line {0}: quantity must be greater than zero")]
    NonPositiveQuantity(usize),

    /// Unit price must not be negative.
    #[error("line {0}: unit price must not be negative")]
    NegativeUnitPrice(usize),
}

/// Validates a document's line items.
///
/// # Errors
///
/// Returns the first violation found, with its 1-based line index.
pub fn validate_line_items(items: &[LineItem]) -> Result<(), LineItemError> {
    if items.is_empty() {
        return Err(LineItemError::Empty);
    }

    for (i, item) in items.iter().enumerate() {
        let line = i + 1;
        if item.description.trim().is_empty() {
            return Err(LineItemError::BlankDescription(line));
        }
        if item.quantity <= Decimal::ZERO {
            return Err(LineItemError::NonPositiveQuantity(line));
        }
        if item.unit_price < Decimal::ZERO {
            return Err(LineItemError::NegativeUnitPrice(line));
        }
    }

    Ok(())
}

/// Computes subtotal, tax, and total for a set of line items.
///
/// `tax_rate` is a fraction (0.11 for 11% VAT); `None` means no tax.
#[must_use]
pub fn compute_totals(items: &[LineItem], tax_rate: Option<Decimal>) -> DocumentTotals {
    let subtotal: Decimal = items.iter().map(LineItem::amount).sum();
    let tax = tax_rate.map_or(Decimal::ZERO, |rate| (subtotal * rate).round_dp(2));

    DocumentTotals {
        subtotal,
        tax,
        total: subtotal + tax,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(description: &str, quantity: Decimal, unit_price: Decimal) -> LineItem {
        LineItem {
            description: description.to_string(),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn test_kind_parse_round_trip() {
        for kind in [
            DocumentKind::Invoice,
            DocumentKind::PurchaseOrder,
            DocumentKind::Receipt,
        ] {
            assert_eq!(DocumentKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(DocumentKind::parse("quote"), None);
    }

    #[test]
    fn test_receipts_have_no_due_date() {
        assert!(DocumentKind::Invoice.has_due_date());
        assert!(DocumentKind::PurchaseOrder.has_due_date());
        assert!(!DocumentKind::Receipt.has_due_date());
    }

    #[test]
    fn test_status_open() {
        assert!(DocumentStatus::Draft.is_open());
        assert!(DocumentStatus::Sent.is_open());
        assert!(!DocumentStatus::Paid.is_open());
        assert!(!DocumentStatus::Overdue.is_open());
        assert!(!DocumentStatus::Cancelled.is_open());
    }

    #[test]
    fn test_overdue_is_sweep_only() {
        assert!(!DocumentStatus::Overdue.is_client_settable());
        assert!(DocumentStatus::Sent.is_client_settable());
        assert!(DocumentStatus::Paid.is_client_settable());
    }

    #[test]
    fn test_line_amount() {
        let line = item("Consulting", dec!(3), dec!(150.50));
        assert_eq!(line.amount(), dec!(451.50));
    }

    #[test]
    fn test_totals_without_tax() {
        let items = vec![
            item("Design", dec!(2), dec!(500)),
            item("Hosting", dec!(1), dec!(120)),
        ];
        let totals = compute_totals(&items, None);
        assert_eq!(totals.subtotal, dec!(1120));
        assert_eq!(totals.tax, dec!(0));
        assert_eq!(totals.total, dec!(1120));
    }

    #[test]
    fn test_totals_with_tax() {
        let items = vec![item("License", dec!(1), dec!(1000))];
        let totals = compute_totals(&items, Some(dec!(0.11)));
        assert_eq!(totals.subtotal, dec!(1000));
        assert_eq!(totals.tax, dec!(110.00));
        assert_eq!(totals.total, dec!(1110.00));
    }

    #[test]
    fn test_tax_rounds_to_cents() {
        let items = vec![item("Widget", dec!(3), dec!(3.33))];
        let totals = compute_totals(&items, Some(dec!(0.11)));
        assert_eq!(totals.subtotal, dec!(9.99));
        assert_eq!(totals.tax, dec!(1.10));
        assert_eq!(totals.total, dec!(11.09));
    }

    #[test]
    fn test_validate_empty_items() {
        assert_eq!(validate_line_items(&[]), Err(LineItemError::Empty));
    }

    #[test]
    fn test_validate_blank_description() {
        let items = vec![item("  ", dec!(1), dec!(10))];
        assert_eq!(
            validate_line_items(&items),
            Err(LineItemError::BlankDescription(1))
        );
    }

    #[test]
    fn test_validate_non_positive_quantity() {
        let items = vec![
            item("ok", dec!(1), dec!(10)),
            item("bad", dec!(0), dec!(10)),
        ];
        assert_eq!(
            validate_line_items(&items),
            Err(LineItemError::NonPositiveQuantity(2))
        );
    }

    #[test]
    fn test_validate_negative_unit_price() {
        let items = vec![item("bad", dec!(1), dec!(-5))];
        assert_eq!(
            validate_line_items(&items),
            Err(LineItemError::NegativeUnitPrice(1))
        );
    }

    #[test]
    fn test_zero_unit_price_is_allowed() {
        let items = vec![item("freebie", dec!(1), dec!(0))];
        assert!(validate_line_items(&items).is_ok());
    }
}
