//! Per-store, per-day invoice numbers of the form `INV-YYMMDD-NNN`.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

const INVOICE_PREFIX: &str = "INV";

/// The calendar day of `now` as seen from the business time zone.
pub fn business_day(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

/// `seq` is 1-based and padded to at least three digits.
pub fn format_invoice_number(day: NaiveDate, seq: i32) -> String {
    format!("{INVOICE_PREFIX}-{}-{seq:03}", day.format("%y%m%d"))
}
