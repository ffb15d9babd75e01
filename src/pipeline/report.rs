//! Actual-vs-predicted comparison table.

use serde::Serialize;

use crate::ml::metrics::percentage_error;

pub const REPORT_TITLE: &str = "[Sample predictions (Unit: KRW)]";
pub const PREDICTED_HEADER: &str = "예측낙찰가";
pub const ERROR_HEADER: &str = "오차(예측-실제)";
pub const ERROR_PCT_HEADER: &str = "오차율(%)";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    /// Row position in the loaded table.
    pub row_index: usize,
    pub actual: f64,
    pub predicted: f64,
    /// `predicted - actual`
    pub error: f64,
    pub error_pct: f64,
}

impl ComparisonRow {
    pub fn new(row_index: usize, actual: f64, predicted: f64) -> Self {
        let error = predicted - actual;
        Self {
            row_index,
            actual,
            predicted,
            error,
            error_pct: percentage_error(error, actual),
        }
    }
}

pub fn comparison_rows(
    row_indices: &[usize],
    actual: &[f64],
    predicted: &[f64],
) -> Vec<ComparisonRow> {
    row_indices
        .iter()
        .zip(actual.iter().zip(predicted))
        .map(|(&row, (&actual, &predicted))| ComparisonRow::new(row, actual, predicted))
        .collect()
}

/// Format like `{:,.0f}`: rounded to an integer with comma thousands separators.
pub fn format_thousands(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let rounded = format!("{value:.0}");
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", rounded.as_str()),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}")
}

/// Render rows as a right-aligned text table keyed by row index.
pub fn render_table(target: &str, rows: &[ComparisonRow]) -> String {
    let header = [
        String::new(),
        target.to_string(),
        PREDICTED_HEADER.to_string(),
        ERROR_HEADER.to_string(),
        ERROR_PCT_HEADER.to_string(),
    ];
    let body: Vec<[String; 5]> = rows
        .iter()
        .map(|row| {
            [
                row.row_index.to_string(),
                format_thousands(row.actual),
                format_thousands(row.predicted),
                format_thousands(row.error),
                format_thousands(row.error_pct),
            ]
        })
        .collect();

    let mut widths = header.clone().map(|cell| display_width(&cell));
    for line in &body {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut out = String::new();
    for line in std::iter::once(&header).chain(&body) {
        let mut text = line[0].clone();
        text.push_str(&padding(&line[0], widths[0]));
        for (cell, &width) in line.iter().zip(&widths).skip(1) {
            text.push_str("  ");
            text.push_str(&padding(cell, width));
            text.push_str(cell);
        }
        out.push_str(text.trim_end());
        out.push('\n');
    }
    out
}

fn padding(cell: &str, width: usize) -> String {
    " ".repeat(width.saturating_sub(display_width(cell)))
}

/// Terminal columns `text` occupies. Hangul and CJK characters take two.
fn display_width(text: &str) -> usize {
    text.chars().map(|ch| if is_wide(ch) { 2 } else { 1 }).sum()
}

fn is_wide(ch: char) -> bool {
    matches!(
        ch as u32,
        0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0x33FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xA960..=0xA97F
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
    )
}
