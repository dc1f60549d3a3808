//! Plain-text rendering for the command-line front end.

use std::fmt::Write;

use crate::schema::{AlignedVector, SchemaCoverage};

/// Format a feature value: integers without a fractional part.
fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// One `column = value` line per schema column, in schema order.
pub fn render_vector(aligned: &AlignedVector) -> String {
    let width = aligned.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    let mut out = String::new();
    for (name, value) in aligned.iter() {
        let _ = writeln!(out, "{name:<width$} = {}", format_value(value));
    }
    out
}

pub fn render_coverage(coverage: &SchemaCoverage) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} schema columns: {} encoded, {} always zero",
        coverage.mapped.len() + coverage.zero_filled.len(),
        coverage.mapped.len(),
        coverage.zero_filled.len()
    );
    for (title, names) in [
        ("always zero (not produced by the encoder)", &coverage.zero_filled),
        ("ignored encoder keys (missing from schema)", &coverage.dropped),
    ] {
        if names.is_empty() {
            continue;
        }
        let _ = writeln!(out, "\n{title}:");
        for name in names {
            let _ = writeln!(out, "  {name}");
        }
    }
    out
}
