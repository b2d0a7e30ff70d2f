//! Report lines written to stdout.

use serde::Serialize;
use std::fmt::Display;

/// Render a report as its delimited form or as one JSON object.
pub fn format_line<T: Display + Serialize>(report: &T, json: bool) -> String {
    if json {
        match serde_json::to_string(report) {
            Ok(line) => return line,
            Err(e) => tracing::warn!("Failed to serialize report as JSON: {}", e),
        }
    }
    report.to_string()
}

pub fn print_line<T: Display + Serialize>(report: &T, json: bool) {
    println!("{}", format_line(report, json));
}
