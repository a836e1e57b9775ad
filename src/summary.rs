//! Plain-text rendering of a batch

use crate::pipeline::{Batch, FileRecord};

/// Characters of encoded data shown per row
pub const DATA_PREVIEW_LEN: usize = 50;

const HEADERS: [&str; 6] = ["Name", "Type", "Size", "Resolution", "Location", "Base64"];

fn row(record: &FileRecord) -> [String; 6] {
    let resolution = record
        .resolution
        .map(|r| format!("{}x{}", r.width, r.height))
        .unwrap_or_default();
    let preview: String = record.encoded_data.chars().take(DATA_PREVIEW_LEN).collect();

    [
        record.name.clone(),
        record.content_type.clone(),
        record.size.to_string(),
        resolution,
        record.location.clone().unwrap_or_default(),
        format!("{}...", preview),
    ]
}

/// Render the summary table, one row per record, followed by any failures.
pub fn render_table(batch: &Batch) -> String {
    let rows: Vec<[String; 6]> = batch.records.iter().map(row).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_line = |cells: &[String]| {
        cells
            .iter()
            .zip(widths.iter())
            .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 4);
    out.push(format_line(&HEADERS.map(String::from)));
    out.push(format_line(&widths.map(|w| "-".repeat(w))));
    for row in &rows {
        out.push(format_line(row));
    }

    if !batch.failures.is_empty() {
        out.push(String::new());
        out.push(format!("{} file(s) failed:", batch.failures.len()));
        for failure in &batch.failures {
            out.push(format!("  {} ({:?}): {}", failure.name, failure.stage, failure.message));
        }
    }

    out.join("\n")
}
