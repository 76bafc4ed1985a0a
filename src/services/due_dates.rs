use chrono::{Datelike, Months, NaiveDate};

/// Next recurring monthly due date for a lease that started on `start_date`.
///
/// The due day is the start date's day of month. If today is on or before it,
/// the due date falls this month, otherwise next month. Days that do not exist
/// in the target month clamp to its last day (a lease starting on the 31st is
/// due on Feb 28/29). `None` start yields `None`.
pub fn next_monthly_due_date(start_date: Option<NaiveDate>, today: NaiveDate) -> Option<NaiveDate> {
    let target_day = start_date?.day();

    let anchor = if today.day() <= target_day {
        first_of_month(today)
    } else {
        first_of_month(today).checked_add_months(Months::new(1))?
    };

    Some(with_clamped_day(anchor, target_day))
}

/// Display form of a due date: `Nov 5, 2026`, or `N/A` when there is none.
pub fn format_due_date(due_date: Option<NaiveDate>) -> String {
    due_date
        .map(|date| date.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

pub(crate) const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// English month name, the key rent records and report buckets use.
pub fn month_name(date: NaiveDate) -> &'static str {
    MONTH_NAMES[date.month0() as usize]
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = first_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .map(|next| next.signed_duration_since(first).num_days() as u32)
        .unwrap_or(31)
}

fn with_clamped_day(month: NaiveDate, day: u32) -> NaiveDate {
    let day = day.min(days_in_month(month)).max(1);
    month.with_day(day).unwrap_or(month)
}
