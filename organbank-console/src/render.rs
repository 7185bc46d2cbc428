//! Plain-text rendering of the views.

use organbank_core::availability::BoardEntry;
use organbank_core::matching::BankSnapshot;
use organbank_core::registry::RegistrySnapshot;
use organbank_sdk::objects::{OrganRequest, Page};
use std::fmt::Write;
use time::OffsetDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

/// Rows shown in the activity feed.
const ACTIVITY_ROWS: usize = 5;
const GAUGE_WIDTH: usize = 20;
const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second] UTC");

pub fn timestamp(at: OffsetDateTime) -> String {
    at.format(TIMESTAMP_FORMAT)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// `[#####...............]` for a 0..=100 percentage.
pub fn gauge(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * GAUGE_WIDTH / 100;
    format!(
        "[{}{}] {percent}%",
        "#".repeat(filled),
        ".".repeat(GAUGE_WIDTH - filled)
    )
}

pub fn registry(snapshot: &RegistrySnapshot) -> String {
    let mut out = String::from("Organ registry\n");
    if snapshot.organs.is_empty() {
        out.push_str("  (no organs known)\n");
    }
    for (organ, status) in &snapshot.organs {
        let marker = if snapshot.is_highlighted(organ.as_str()) {
            "  <- just donated"
        } else {
            ""
        };
        let _ = writeln!(out, "  {:<12} {status}{marker}", organ.as_str());
    }
    out
}

pub fn dashboard(bank: &BankSnapshot, organs: &RegistrySnapshot) -> String {
    let stats = &bank.stats;
    let mut out = String::new();
    let _ = writeln!(out, "Organ bank dashboard");
    if let Some(at) = bank.refreshed_at {
        let _ = writeln!(out, "Last refresh: {}", timestamp(at));
    }
    let _ = writeln!(
        out,
        "Donors: {}  Pledged organs: {}  Requests: {}  Fulfilled: {}  Pending: {}",
        stats.total_donors, stats.total_organs, stats.total_requests, stats.fulfilled, stats.pending
    );
    let _ = writeln!(out, "Overall matching {}", gauge(stats.fulfillment_rate()));
    out.push('\n');
    out.push_str(&registry(organs));
    out.push('\n');

    out.push_str("Donors\n");
    for donor in &bank.donors {
        let _ = writeln!(
            out,
            "  {:<20} {}",
            truncate(&donor.name, 20),
            donor.organ_names().join(", ")
        );
    }
    out.push('\n');

    let _ = writeln!(
        out,
        "{:<20} {:<14} {:<8} {:>5}  {}",
        "Hospital", "Organ", "Urgency", "Match", "Status"
    );
    for row in &bank.requests {
        let _ = writeln!(
            out,
            "{:<20} {:<14} {:<8} {:>4}%  {}",
            truncate(&row.request.hospital_name, 20),
            truncate(&row.request.organ_type, 14),
            row.request.urgency().to_string(),
            row.match_score,
            row.display_status
        );
    }

    out.push_str("\nRecent activity\n");
    for row in bank.recent_activity(ACTIVITY_ROWS) {
        let verb = if row.is_fulfilled() { "matched" } else { "waiting" };
        let _ = writeln!(
            out,
            "  {} requested {} for {} ({verb})",
            row.request.hospital_name, row.request.organ_type, row.request.patient_name
        );
    }
    out
}

pub fn availability(entries: &[&BoardEntry], loaded_at: Option<OffsetDateTime>) -> String {
    let mut out = String::from("Organ availability\n");
    if let Some(at) = loaded_at {
        let _ = writeln!(out, "Last updated: {}", timestamp(at));
    }
    if entries.is_empty() {
        out.push_str("  No organs available right now.\n");
        return out;
    }
    for entry in entries {
        let low = if entry.is_low_stock() { "  LOW" } else { "" };
        let _ = writeln!(
            out,
            "  {:<14} {:<12} {:>3} units {}{low}",
            truncate(&entry.name, 14),
            entry.status.to_string(),
            entry.units,
            gauge(u8::try_from(entry.fill_percent()).unwrap_or(100))
        );
    }
    out
}

pub fn request_page(page: &Page<OrganRequest>, number: u32) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<20} {:<20} {:<14} {:<5} {:<8} {}",
        "Id", "Hospital", "Patient", "Organ", "Blood", "Urgency", "Status"
    );
    for request in &page.content {
        let id = request.id.map(|id| id.to_string()).unwrap_or_default();
        let blood = request.blood_type.map(|b| b.as_str()).unwrap_or("-");
        let _ = writeln!(
            out,
            "{id:>5}  {:<20} {:<20} {:<14} {blood:<5} {:<8} {}",
            truncate(&request.hospital_name, 20),
            truncate(&request.patient_name, 20),
            truncate(&request.organ_type, 14),
            request.urgency().to_string(),
            request.status.as_deref().unwrap_or("-")
        );
    }
    let _ = writeln!(
        out,
        "Page {} of {}",
        number + 1,
        page.total_pages.max(1)
    );
    out
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    let mut short: String = value.chars().take(width.saturating_sub(1)).collect();
    short.push('~');
    short
}
