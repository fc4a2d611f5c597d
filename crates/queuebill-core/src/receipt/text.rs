//! Plain-text rendering for terminals.
//!
//! Widths are counted in `char`s. Thai combining marks make the right edge
//! ragged on some terminals; the content is unaffected.

use super::tiling::{TiledPage, TILE_COLUMNS};
use super::{Block, DividerStyle, LineStyle, ReceiptLayout};

/// Narrowest receipt that still fits a number and its caption.
pub const MIN_WIDTH: usize = 16;

/// Default width of one receipt column.
pub const DEFAULT_WIDTH: usize = 30;

/// A single receipt as a boxed block of text.
pub fn render_receipt(layout: &ReceiptLayout, width: usize) -> String {
    receipt_lines(layout, width).join("\n")
}

/// A full page: the grid rows of the page, copies side by side.
pub fn render_page(page: &TiledPage, column_width: usize) -> String {
    let mut out = String::new();
    if page.context.is_print() {
        out.push_str("[print]\n");
    } else {
        out.push_str(&format!("[preview x{}]\n", page.scale()));
    }

    for (row_index, row) in page.tiles.chunks(TILE_COLUMNS).enumerate() {
        if row_index > 0 {
            out.push('\n');
        }
        let columns: Vec<Vec<String>> = row
            .iter()
            .map(|tile| receipt_lines(&tile.receipt, column_width))
            .collect();
        let height = columns.iter().map(Vec::len).max().unwrap_or(0);
        let blank = " ".repeat(column_width.max(MIN_WIDTH));

        for line in 0..height {
            let cells: Vec<&str> = columns
                .iter()
                .map(|lines| lines.get(line).map(String::as_str).unwrap_or(&blank))
                .collect();
            out.push_str(cells.join(" ").trim_end());
            out.push('\n');
        }
    }
    out
}

fn receipt_lines(layout: &ReceiptLayout, width: usize) -> Vec<String> {
    let width = width.max(MIN_WIDTH);
    let inner = width - 4;
    let border = format!("+{}+", "-".repeat(width - 2));

    let mut lines = vec![border.clone()];
    for (i, panel) in layout.panels.iter().enumerate() {
        if i > 0 {
            let rule: String = match layout.divider {
                Some(DividerStyle::Dashed) | None => "- ".repeat(width).chars().take(width - 2).collect(),
                Some(DividerStyle::Solid) => "-".repeat(width - 2),
            };
            lines.push(format!("|{}|", rule));
        }
        for block in &panel.blocks {
            for content in block_lines(block, inner) {
                lines.push(format!("| {} |", fit(&content, inner)));
            }
        }
    }
    lines.push(border);
    lines
}

fn block_lines(block: &Block, inner: usize) -> Vec<String> {
    match block {
        Block::Title { text, .. } => vec![text.clone()],
        Block::Badge { text } => vec![format!("[{}]", text)],
        Block::Number { label, value, .. } => {
            let text = match label {
                Some(label) => format!("{} {}", label, value),
                None => value.to_string(),
            };
            vec![right_align(&text, inner)]
        }
        Block::WritingLines { count, style } => {
            let fill = match style {
                LineStyle::Blank => "_".repeat(inner),
                LineStyle::Dotted => ".".repeat(inner),
            };
            let mut lines = Vec::with_capacity(usize::from(*count) * 2);
            for _ in 0..*count {
                lines.push(String::new());
                lines.push(fill.clone());
            }
            lines
        }
        Block::TotalField { label, unit } => {
            let used = label.chars().count() + unit.chars().count() + 2;
            let blank = "_".repeat(inner.saturating_sub(used).max(1));
            vec![format!("{} {} {}", label, blank, unit)]
        }
        Block::Footer { text } => vec![right_align(text, inner)],
    }
}

fn right_align(text: &str, inner: usize) -> String {
    let len = text.chars().count();
    if len >= inner {
        text.to_string()
    } else {
        format!("{}{}", " ".repeat(inner - len), text)
    }
}

/// Truncates or pads `text` to exactly `inner` chars.
fn fit(text: &str, inner: usize) -> String {
    let mut out: String = text.chars().take(inner).collect();
    let len = out.chars().count();
    out.push_str(&" ".repeat(inner - len));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{ReceiptLabels, ReceiptLayoutEngine, ReceiptOptions};
    use crate::types::Bill;

    fn english() -> ReceiptLayoutEngine {
        ReceiptLayoutEngine::new(ReceiptOptions {
            labels: ReceiptLabels::english("Pad Thai"),
            ..ReceiptOptions::default()
        })
    }

    #[test]
    fn test_dine_in_receipt() {
        let engine = english();
        let text = render_receipt(&engine.layout(&Bill::dine_in(7).unwrap()), 30);
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines.iter().all(|l| l.chars().count() == 30));
        assert!(lines[1].contains("Pad Thai"));
        assert!(text.contains("[DINE IN]"));
        assert!(text.contains("TABLE 7 |"));
        let ruled = lines.iter().filter(|l| l.contains(&"_".repeat(20))).count();
        assert_eq!(ruled, 6);
        assert!(text.contains("| TOTAL ______"));
    }

    #[test]
    fn test_takeaway_receipt_has_tear_line() {
        let engine = english();
        let text = render_receipt(&engine.layout(&Bill::takeaway(23).unwrap()), 24);

        assert!(text.contains("|- - - - "));
        assert_eq!(text.matches("QUEUE 23").count(), 2);
        assert!(text.contains("[CUSTOMER COPY"));
    }

    #[test]
    fn test_page_places_three_copies_per_row() {
        let engine = english();
        let page = render_page(&engine.print_page(&Bill::takeaway(9).unwrap()), 24);

        assert!(page.starts_with("[print]\n"));
        assert_eq!(page.matches("QUEUE 9").count(), 12);
        let number_rows: Vec<&str> = page.lines().filter(|l| l.contains("QUEUE 9")).collect();
        assert_eq!(number_rows.len(), 4);
        assert!(number_rows.iter().all(|l| l.matches("QUEUE 9").count() == 3));
    }

    #[test]
    fn test_narrow_width_is_clamped() {
        let engine = english();
        let text = render_receipt(&engine.layout(&Bill::dine_in(1).unwrap()), 4);
        assert!(text.lines().all(|l| l.chars().count() == MIN_WIDTH));
    }

    #[test]
    fn test_preview_header() {
        let page = english().preview(&Bill::dine_in(2).unwrap());
        assert!(render_page(&page, DEFAULT_WIDTH).starts_with("[preview x0.45]"));
    }
}
