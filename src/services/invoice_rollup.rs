use rust_decimal::Decimal;
use serde::Serialize;

use crate::schemas::{amount_or_zero, round_money, LineItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvoiceRollup {
    pub subtotal: Decimal,
    pub payment_received: Decimal,
    pub net_subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

impl InvoiceRollup {
    /// Same figures rounded to cents for display.
    pub fn rounded(self) -> Self {
        Self {
            subtotal: round_money(self.subtotal),
            payment_received: round_money(self.payment_received),
            net_subtotal: round_money(self.net_subtotal),
            tax_amount: round_money(self.tax_amount),
            total: round_money(self.total),
        }
    }
}

/// Subtotal, payments, tax and total for an invoice's lines.
///
/// Tax applies to what is still owed (`subtotal - payment_received`). Nothing
/// is rounded here. Sums that leave the `Decimal` range saturate at its bounds.
pub fn rollup(line_items: &[LineItem], tax_rate_percent: Option<Decimal>) -> InvoiceRollup {
    let subtotal = sum_amounts(line_items.iter().map(|item| item.price));
    let payment_received = sum_amounts(line_items.iter().map(|item| item.payment));
    let net_subtotal = subtotal.saturating_sub(payment_received);
    let tax_amount = percent_of(net_subtotal, amount_or_zero(tax_rate_percent));

    InvoiceRollup {
        subtotal,
        payment_received,
        net_subtotal,
        tax_amount,
        total: net_subtotal.saturating_add(tax_amount),
    }
}

pub fn balance_due(item: &LineItem) -> Decimal {
    amount_or_zero(item.price).saturating_sub(amount_or_zero(item.payment))
}

/// Adds optional amounts, absent counting as zero.
pub(crate) fn sum_amounts(amounts: impl IntoIterator<Item = Option<Decimal>>) -> Decimal {
    amounts
        .into_iter()
        .map(amount_or_zero)
        .fold(Decimal::ZERO, Decimal::saturating_add)
}

/// `rate_percent` percent of `amount`.
pub(crate) fn percent_of(amount: Decimal, rate_percent: Decimal) -> Decimal {
    amount
        .checked_mul(rate_percent)
        .map(|scaled| scaled / Decimal::ONE_HUNDRED)
        .unwrap_or_else(|| amount.saturating_mul(rate_percent / Decimal::ONE_HUNDRED))
}

/// Per-row balance due, in line order.
pub fn line_balances(line_items: &[LineItem]) -> Vec<Decimal> {
    line_items.iter().map(balance_due).collect()
}
