//! CSV rendering of the admin registration list.

use std::fmt::Write as _;

use chrono::NaiveDate;

use super::classifier::festival_offset;
use super::registration::Registration;

/// Header line of the export.
pub const CSV_HEADER: &str =
    "Name,Email,Phone,College,Ticket Type,Amount,Payment Status,Registration Date";

/// Renders `registrations` as CSV, one row per registration in input order.
///
/// Text columns are double-quoted with embedded quotes doubled; the amount
/// is a bare number; the date is the festival-local `YYYY-MM-DD`.
#[must_use]
pub fn registrations_csv<'a>(registrations: impl IntoIterator<Item = &'a Registration>) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for reg in registrations {
        let date = reg
            .created_at
            .with_timezone(&festival_offset())
            .format("%Y-%m-%d")
            .to_string();
        let _ = writeln!(
            out,
            "{},{},{},{},{},{},{},{}",
            quoted(&reg.name),
            quoted(&reg.email),
            quoted(&reg.phone),
            quoted(reg.college.as_deref().unwrap_or_default()),
            quoted(&reg.ticket_type),
            reg.amount.get(),
            quoted(reg.payment_status.as_str()),
            quoted(&date),
        );
    }
    out
}

/// Download name for an export produced on `today`.
#[must_use]
pub fn export_filename(today: NaiveDate) -> String {
    format!("registrations-{}.csv", today.format("%Y-%m-%d"))
}

fn quoted(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
