//! Chart datasets for the invoice reports page.
//!
//! Every reducer keeps labels in first-seen (insertion) order. Months are not
//! sorted chronologically and are keyed by month name only, so January 2025
//! and January 2026 share a bucket.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::schemas::{amount_or_zero, round_money, Invoice};
use crate::services::due_dates::month_name;
use crate::services::invoice_rollup::{percent_of, sum_amounts};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryFrequency {
    pub labels: Vec<String>,
    pub counts: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MonthlyCollected {
    pub labels: Vec<String>,
    pub collected: Vec<Decimal>,
    pub tax: Vec<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelineSeries {
    pub label: String,
    /// Duration in days at the invoice's own month index, `None` elsewhere.
    pub data: Vec<Option<i64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub labels: Vec<String>,
    pub series: Vec<TimelineSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InvoiceTrends {
    pub category_frequency: CategoryFrequency,
    pub monthly: MonthlyCollected,
    pub timeline: Timeline,
}

/// Ordered label set that remembers where each label was first seen.
#[derive(Default)]
struct Buckets {
    labels: Vec<String>,
    index: HashMap<String, usize>,
}

impl Buckets {
    fn slot(&mut self, label: &str) -> usize {
        if let Some(position) = self.index.get(label) {
            return *position;
        }
        let position = self.labels.len();
        self.labels.push(label.to_string());
        self.index.insert(label.to_string(), position);
        position
    }
}

pub fn category_frequency(invoices: &[Option<Invoice>]) -> CategoryFrequency {
    let mut buckets = Buckets::default();
    let mut counts: Vec<u32> = Vec::new();

    for item in invoices.iter().flatten().flat_map(|invoice| &invoice.line_items) {
        let slot = buckets.slot(item.category_label());
        if slot == counts.len() {
            counts.push(0);
        }
        counts[slot] += 1;
    }

    CategoryFrequency {
        labels: buckets.labels,
        counts,
    }
}

/// Payments collected per start month, with tax taken per invoice at its own rate.
pub fn monthly_collected(invoices: &[Option<Invoice>]) -> MonthlyCollected {
    let mut buckets = Buckets::default();
    let mut collected: Vec<Decimal> = Vec::new();
    let mut tax: Vec<Decimal> = Vec::new();

    for invoice in invoices.iter().flatten() {
        let Some(start_date) = invoice.start_date else {
            continue;
        };
        let slot = buckets.slot(month_name(start_date));
        if slot == collected.len() {
            collected.push(Decimal::ZERO);
            tax.push(Decimal::ZERO);
        }

        let paid = invoice_payments(invoice);
        collected[slot] = collected[slot].saturating_add(paid);
        tax[slot] = tax[slot].saturating_add(percent_of(paid, amount_or_zero(invoice.tax_rate)));
    }

    MonthlyCollected {
        labels: buckets.labels,
        collected,
        tax,
    }
}

pub fn timeline(invoices: &[Option<Invoice>]) -> Timeline {
    let mut buckets = Buckets::default();
    let dated = invoices
        .iter()
        .flatten()
        .filter_map(|invoice| {
            let start_date = invoice.start_date?;
            Some((invoice, buckets.slot(month_name(start_date))))
        })
        .collect::<Vec<_>>();

    let width = buckets.labels.len();
    let series = dated
        .into_iter()
        .map(|(invoice, slot)| {
            let mut data = vec![None; width];
            data[slot] = invoice
                .start_date
                .zip(invoice.end_date)
                .map(|(start, end)| end.signed_duration_since(start).num_days());
            TimelineSeries {
                label: timeline_label(invoice),
                data,
            }
        })
        .collect();

    Timeline {
        labels: buckets.labels,
        series,
    }
}

/// All report datasets at once. Null invoices are skipped.
pub fn normalize_invoice_trends(invoices: &[Option<Invoice>]) -> InvoiceTrends {
    InvoiceTrends {
        category_frequency: category_frequency(invoices),
        monthly: monthly_collected(invoices),
        timeline: timeline(invoices),
    }
}

fn invoice_payments(invoice: &Invoice) -> Decimal {
    sum_amounts(invoice.line_items.iter().map(|item| item.payment))
}

fn timeline_label(invoice: &Invoice) -> String {
    let title = match invoice.title.trim() {
        "" => "Untitled invoice",
        title => title,
    };
    match invoice.line_items.first() {
        Some(item) => {
            let method = item
                .payment_method
                .as_deref()
                .map(str::trim)
                .filter(|method| !method.is_empty())
                .unwrap_or("unspecified method");
            format!(
                "{title} (paid {} via {method})",
                round_money(amount_or_zero(item.payment))
            )
        }
        None => format!("{title} (no line items)"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::{category_frequency, monthly_collected, normalize_invoice_trends, timeline};
    use crate::schemas::{Invoice, LineItem, LineItemCategory};

    fn date(raw: &str) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
    }

    fn paid(payment: Decimal) -> LineItem {
        LineItem {
            payment: Some(payment),
            ..LineItem::default()
        }
    }

    fn categorized(label: Option<&str>) -> LineItem {
        LineItem {
            category: Some(LineItemCategory {
                label: label.map(ToOwned::to_owned),
            }),
            ..LineItem::default()
        }
    }

    fn invoice(start: &str, end: &str, tax_rate: Decimal, line_items: Vec<LineItem>) -> Invoice {
        Invoice {
            title: "Unit 4B".to_string(),
            start_date: date(start),
            end_date: date(end),
            tax_rate: Some(tax_rate),
            line_items,
            ..Invoice::default()
        }
    }

    #[test]
    fn sums_collected_and_tax_per_month() {
        let invoices = vec![
            Some(invoice("2025-01-01", "2025-01-31", dec!(10), vec![paid(dec!(100))])),
            Some(invoice("2025-01-15", "2025-02-15", dec!(10), vec![paid(dec!(50))])),
        ];
        let monthly = monthly_collected(&invoices);
        assert_eq!(monthly.labels, vec!["January"]);
        assert_eq!(monthly.collected, vec![dec!(150)]);
        assert_eq!(monthly.tax, vec![dec!(15)]);
    }

    #[test]
    fn taxes_each_invoice_at_its_own_rate() {
        let invoices = vec![
            Some(invoice("2025-03-01", "2025-03-31", dec!(10), vec![paid(dec!(100))])),
            Some(invoice("2025-03-05", "2025-03-31", dec!(0), vec![paid(dec!(100))])),
        ];
        let monthly = monthly_collected(&invoices);
        assert_eq!(monthly.collected, vec![dec!(200)]);
        assert_eq!(monthly.tax, vec![dec!(10)]);
    }

    #[test]
    fn keeps_months_in_first_seen_order() {
        let invoices = vec![
            Some(invoice("2025-03-01", "2025-03-31", dec!(0), vec![paid(dec!(1))])),
            None,
            Some(invoice("2025-01-01", "2025-01-31", dec!(0), vec![paid(dec!(2))])),
            Some(invoice("2026-03-01", "2026-03-31", dec!(0), vec![paid(dec!(3))])),
        ];
        let monthly = monthly_collected(&invoices);
        assert_eq!(monthly.labels, vec!["March", "January"]);
        assert_eq!(monthly.collected, vec![dec!(4), dec!(2)]);
    }

    #[test]
    fn counts_categories_in_first_seen_order() {
        let invoices = vec![
            Some(Invoice {
                line_items: vec![categorized(Some("Rent")), categorized(Some("Rent"))],
                ..Invoice::default()
            }),
            None,
            Some(Invoice {
                line_items: vec![
                    categorized(Some("Utilities")),
                    categorized(None),
                    LineItem::default(),
                ],
                ..Invoice::default()
            }),
        ];
        let frequency = category_frequency(&invoices);
        assert_eq!(frequency.labels, vec!["Rent", "Utilities", "Unknown Item"]);
        assert_eq!(frequency.counts, vec![2, 1, 2]);
    }

    #[test]
    fn timeline_is_sparse_per_invoice() {
        let mut first = invoice("2025-01-01", "2025-01-31", dec!(0), vec![paid(dec!(500))]);
        first.line_items[0].payment_method = Some("Card".to_string());
        let second = invoice("2025-02-10", "2025-02-20", dec!(0), vec![]);
        let third = invoice("2025-01-20", "2025-01-25", dec!(0), vec![paid(dec!(12.5))]);

        let chart = timeline(&[Some(first), None, Some(second), Some(third)]);
        assert_eq!(chart.labels, vec!["January", "February"]);
        assert_eq!(chart.series.len(), 3);
        assert_eq!(chart.series[0].data, vec![Some(30), None]);
        assert_eq!(chart.series[1].data, vec![None, Some(10)]);
        assert_eq!(chart.series[2].data, vec![Some(5), None]);
        assert_eq!(chart.series[0].label, "Unit 4B (paid 500 via Card)");
        assert_eq!(chart.series[1].label, "Unit 4B (no line items)");
        assert_eq!(
            chart.series[2].label,
            "Unit 4B (paid 12.5 via unspecified method)"
        );
    }

    #[test]
    fn inverted_period_keeps_its_signed_duration() {
        let backwards = invoice("2025-04-20", "2025-04-10", dec!(0), vec![]);
        let same_day = invoice("2025-04-01", "2025-04-01", dec!(0), vec![]);
        let chart = timeline(&[Some(backwards), Some(same_day)]);
        assert_eq!(chart.series[0].data, vec![Some(-10)]);
        assert_eq!(chart.series[1].data, vec![Some(0)]);
    }

    #[test]
    fn oversized_payments_saturate() {
        let invoices = vec![
            Some(invoice("2025-05-01", "2025-05-31", dec!(10), vec![paid(Decimal::MAX); 2])),
            Some(invoice("2025-05-02", "2025-05-31", Decimal::MAX, vec![paid(dec!(1000000000000))])),
        ];
        let monthly = monthly_collected(&invoices);
        assert_eq!(monthly.collected, vec![Decimal::MAX]);
        assert_eq!(monthly.tax, vec![Decimal::MAX]);
    }

    #[test]
    fn empty_input_yields_empty_datasets() {
        let trends = normalize_invoice_trends(&[]);
        assert!(trends.category_frequency.labels.is_empty());
        assert!(trends.category_frequency.counts.is_empty());
        assert!(trends.monthly.labels.is_empty());
        assert!(trends.monthly.collected.is_empty());
        assert!(trends.monthly.tax.is_empty());
        assert!(trends.timeline.labels.is_empty());
        assert!(trends.timeline.series.is_empty());
        assert_eq!(normalize_invoice_trends(&[None, None]), trends);
    }
}
