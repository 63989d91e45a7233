// SPDX-License-Identifier: MIT

//! Plain-text tabulation of enduro attempts.
//!
//! Layout:
//! ```text
//! NAME           DISTANCE    ELEVATION  Track1  Track2  TOTAL TIME
//! -------------  ----------  ---------  ------  ------  ----------
//! recovery ride  3.78 miles  1502 feet  1:12    3:04    4:16
//! ```

use crate::models::EnduroAttempt;
use crate::time_utils::{meters_to_feet, meters_to_miles, to_min_sec};

/// Render attempts for one enduro as an aligned table. Segment columns are
/// named from the first attempt; an empty list renders headers only.
pub fn tabulate_enduro_attempts(attempts: &[EnduroAttempt]) -> String {
    let mut header: Vec<String> = vec![
        "NAME".to_string(),
        "DISTANCE".to_string(),
        "ELEVATION".to_string(),
    ];
    if let Some(first) = attempts.first() {
        for segment_attempt in &first.segment_attempts {
            header.push(segment_attempt.name.clone());
        }
    }
    header.push("TOTAL TIME".to_string());

    let rows: Vec<Vec<String>> = attempts
        .iter()
        .map(|attempt| {
            let mut row = vec![
                attempt.name.clone(),
                format!("{:.2} miles", meters_to_miles(attempt.distance as f64)),
                format!(
                    "{} feet",
                    meters_to_feet(attempt.total_elevation_gain as f64)
                ),
            ];
            for segment_attempt in &attempt.segment_attempts {
                row.push(to_min_sec(segment_attempt.elapsed_time));
            }
            row.push(to_min_sec(attempt.enduro_time));
            row
        })
        .collect();

    render_table(&header, &rows)
}

fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    // Widths cover the widest row, not just the header; stored documents
    // may carry more segment columns than the first attempt.
    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i == widths.len() {
                widths.push(cell.len());
            } else if cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let mut out = format_row(header, &widths);
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push('\n');
        out.push_str(&format_row(row, &widths));
    }
    out
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell))
        .collect();
    padded.join("  ").trim_end().to_string()
}
