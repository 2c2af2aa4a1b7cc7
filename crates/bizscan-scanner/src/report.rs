//! Text rendering of report records.
//!
//! Records are rendered to a complete `String` before any file is touched,
//! so a record reaches the report in a single write.

use crate::parser::{BusinessListing, ResultPageParser};
use crate::registry::RegistryForm;
use bizscan_core::SearchResult;
use std::fmt::{self, Write as _};

/// Placeholder for a sub-field a result block does not carry.
pub const NOT_AVAILABLE: &str = "N/A";

/// Closes every record.
pub const RECORD_SEPARATOR: &str =
    "============================================================";

const TITLE_RULE: &str = "----------------------------------------";

/// Report header written once per run.
pub fn header() -> String {
    format!("BUSINESS REGISTRY SEARCH REPORT\n{RECORD_SEPARATOR}\n\n")
}

/// Per-record status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStatus {
    Found,
    NoData,
    Error,
}

impl RecordStatus {
    /// Classify a delivered result.
    pub fn classify(result: &SearchResult, form: &RegistryForm) -> Self {
        if !result.success() {
            Self::Error
        } else if form.reports_no_results(result.raw_content()) {
            Self::NoData
        } else {
            Self::Found
        }
    }
}

impl fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Found => "Found",
            Self::NoData => "No Data",
            Self::Error => "Error",
        })
    }
}

/// Render one complete record, separator included.
///
/// `snapshot_name` is the file the raw page was saved under, if any.
pub fn render_record(
    result: &SearchResult,
    status: RecordStatus,
    snapshot_name: Option<&str>,
    parser: &ResultPageParser,
) -> String {
    let mut out = String::new();

    // Writing into a String cannot fail
    let _ = writeln!(out, "SEARCH: {}", result.label());
    let _ = writeln!(out, "{TITLE_RULE}");
    let _ = writeln!(out, "Status: {status}");
    let _ = writeln!(out, "Time: {:.2}s", result.elapsed().as_secs_f64());

    if result.success() {
        if let Some(name) = snapshot_name {
            let _ = writeln!(out, "Saved HTML: {name}");
        }

        if status == RecordStatus::Found {
            match parser.listings(result.raw_content()) {
                Ok(listings) => render_listings(&mut out, &listings),
                Err(e) => {
                    let _ = writeln!(out, "Error parsing HTML: {e}");
                }
            }
        }
    } else {
        let _ = writeln!(
            out,
            "Error: {}",
            result.error_message().unwrap_or("unknown error")
        );
    }

    let _ = write!(out, "\n{RECORD_SEPARATOR}\n\n");
    out
}

fn render_listings(out: &mut String, listings: &[BusinessListing]) {
    let _ = writeln!(out, "Results Found: {}\n", listings.len());

    for (idx, listing) in listings.iter().enumerate() {
        let field =
            |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let _ = writeln!(out, "--- Result #{} ---", idx + 1);
        let _ = writeln!(out, "Business Name: {}", field(&listing.name));
        let _ = writeln!(out, "Business Type: {}", field(&listing.business_type));
        let _ = writeln!(out, "Amalgamation/Inc. Date: {}", field(&listing.date));
        let _ = writeln!(out, "Location: {}", field(&listing.location));
        let _ = writeln!(out, "Status: {}", field(&listing.status));
        out.push('\n');
    }
}
