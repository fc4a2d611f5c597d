//! HTML rendering of receipts and tiled pages.
//!
//! The output is a standalone document: open it in a browser for the
//! preview, or hand it to the print dialog. Each tile is absolutely
//! positioned in millimetres and its receipt is drawn at native size inside
//! a `transform: scale(..)`, so preview and print share one layout.

use std::fmt::Write as _;

use super::tiling::TiledPage;
use super::{Block, DividerStyle, Emphasis, LineStyle, Panel, PanelRole, ReceiptLayout, Template};

const STYLE: &str = r#"
@page { size: A4 landscape; margin: 0; }
* { box-sizing: border-box; }
body { margin: 0; background: #f1f5f9; font-family: "Sarabun", "Noto Sans Thai", sans-serif; color: #1e293b; }
.sheet { position: relative; background: #fff; margin: 0 auto; }
.tile { position: absolute; overflow: hidden; border: 0.2mm solid #f1f5f9; }
.receipt { transform-origin: top left; border: 1mm solid #1e293b; display: flex; flex-direction: column; background: #fff; overflow: hidden; }
.panel { padding: 6mm; display: flex; flex-direction: column; }
.panel-single, .panel-shop_copy { flex-grow: 1; }
.panel-customer_copy { background: #fff7ed; }
.divider { margin: 0; border: 0; border-top: 1.2mm solid #94a3b8; }
.divider-dashed { border-top-style: dashed; }
.title { margin: 0; color: #ea580c; font-weight: 800; line-height: 1; }
.title-normal { font-size: 6mm; }
.title-large { font-size: 9mm; }
.badge { display: inline-block; margin-top: 3mm; padding: 1mm 3mm; border: 0.5mm solid currentColor; border-radius: 1mm; font-weight: 800; font-size: 3.5mm; align-self: flex-start; }
.number { display: flex; flex-direction: column; align-items: flex-end; font-weight: 900; }
.number-label { font-size: 4mm; }
.number-value { font-family: ui-monospace, monospace; line-height: 1; color: #ea580c; }
.number-large .number-value { font-size: 14mm; }
.number-huge .number-value { font-size: 24mm; }
.writing-lines { flex-grow: 1; padding: 1mm 0; }
.writing-line { height: 9mm; border-bottom: 0.5mm solid #e2e8f0; }
.line-dotted { border-bottom-style: dotted; border-bottom-color: #64748b; }
.total { display: flex; align-items: flex-end; gap: 4mm; margin-top: 4mm; padding-top: 4mm; border-top: 1.2mm solid #1e293b; font-weight: 900; font-size: 6mm; white-space: nowrap; }
.total-blank { flex-grow: 1; height: 10mm; border-bottom: 1.2mm solid #1e293b; }
.footer { margin: 2mm 0 0; font-size: 3mm; color: #64748b; text-align: right; }
@media print { body { background: #fff; } .tile { border: none; } }
"#;

/// Escapes text for HTML element content and attribute values.
pub fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// A complete HTML document for a tiled page.
pub fn render_page(page: &TiledPage, title: &str) -> String {
    let scale = page.scale();
    let sheet = page.scaled_page();
    let (tile_width, tile_height) = page.tile_size();
    let context = if page.context.is_print() { "print" } else { "preview" };

    let mut body = String::new();
    let _ = write!(
        body,
        r#"<main class="sheet" data-context="{}" style="width:{:.2}mm;height:{:.2}mm">"#,
        context, sheet.width_mm, sheet.height_mm
    );
    for tile in &page.tiles {
        let _ = write!(
            body,
            r#"<div class="tile" data-index="{}" style="left:{:.2}mm;top:{:.2}mm;width:{:.2}mm;height:{:.2}mm">"#,
            tile.index, tile.frame.x, tile.frame.y, tile.frame.width, tile.frame.height
        );
        body.push_str(&render_receipt_sized(
            &tile.receipt,
            tile_width,
            tile_height,
            scale,
        ));
        body.push_str("</div>");
    }
    body.push_str("</main>");

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"UTF-8\"/>\n<title>{}</title>\n<style>{}</style>\n</head>\n<body>{}</body>\n</html>\n",
        escape(title),
        STYLE,
        body
    )
}

/// A single receipt at native tile size, without the page around it.
pub fn render_receipt(layout: &ReceiptLayout) -> String {
    let page = super::tiling::PageSize::A4_LANDSCAPE;
    render_receipt_sized(
        layout,
        page.width_mm / super::tiling::TILE_COLUMNS as f64,
        page.height_mm / super::tiling::TILE_ROWS as f64,
        1.0,
    )
}

fn render_receipt_sized(layout: &ReceiptLayout, width: f64, height: f64, scale: f64) -> String {
    let template = match layout.template {
        Template::DineIn => "dine_in",
        Template::Takeaway => "takeaway",
    };

    let mut out = String::new();
    let _ = write!(
        out,
        r#"<article class="receipt receipt-{}" style="width:{:.2}mm;height:{:.2}mm;transform:scale({})">"#,
        template, width, height, scale
    );
    for (i, panel) in layout.panels.iter().enumerate() {
        if i > 0 {
            match layout.divider {
                Some(DividerStyle::Dashed) => out.push_str(r#"<hr class="divider divider-dashed"/>"#),
                Some(DividerStyle::Solid) => out.push_str(r#"<hr class="divider"/>"#),
                None => {}
            }
        }
        render_panel(&mut out, panel);
    }
    out.push_str("</article>");
    out
}

fn render_panel(out: &mut String, panel: &Panel) {
    let role = match panel.role {
        PanelRole::Single => "single",
        PanelRole::CustomerCopy => "customer_copy",
        PanelRole::ShopCopy => "shop_copy",
    };
    let _ = write!(out, r#"<section class="panel panel-{}">"#, role);
    for block in &panel.blocks {
        render_block(out, block);
    }
    out.push_str("</section>");
}

fn render_block(out: &mut String, block: &Block) {
    match block {
        Block::Title { text, emphasis } => {
            let _ = write!(
                out,
                r#"<h1 class="title title-{}">{}</h1>"#,
                emphasis_class(*emphasis),
                escape(text)
            );
        }
        Block::Badge { text } => {
            let _ = write!(out, r#"<span class="badge">{}</span>"#, escape(text));
        }
        Block::Number {
            label,
            value,
            emphasis,
        } => {
            let _ = write!(out, r#"<div class="number number-{}">"#, emphasis_class(*emphasis));
            if let Some(label) = label {
                let _ = write!(out, r#"<span class="number-label">{}</span>"#, escape(label));
            }
            let _ = write!(out, r#"<span class="number-value">{}</span></div>"#, value);
        }
        Block::WritingLines { count, style } => {
            let line_class = match style {
                LineStyle::Blank => "line-blank",
                LineStyle::Dotted => "line-dotted",
            };
            out.push_str(r#"<div class="writing-lines">"#);
            for _ in 0..*count {
                let _ = write!(out, r#"<div class="writing-line {}"></div>"#, line_class);
            }
            out.push_str("</div>");
        }
        Block::TotalField { label, unit } => {
            let _ = write!(
                out,
                r#"<div class="total"><span>{}</span><span class="total-blank"></span><span>{}</span></div>"#,
                escape(label),
                escape(unit)
            );
        }
        Block::Footer { text } => {
            let _ = write!(out, r#"<p class="footer">{}</p>"#, escape(text));
        }
    }
}

fn emphasis_class(emphasis: Emphasis) -> &'static str {
    match emphasis {
        Emphasis::Normal => "normal",
        Emphasis::Large => "large",
        Emphasis::Huge => "huge",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{ReceiptLabels, ReceiptLayoutEngine, ReceiptOptions};
    use crate::types::Bill;

    #[test]
    fn test_print_page_has_six_takeaway_receipts() {
        let engine = ReceiptLayoutEngine::default();
        let html = render_page(&engine.print_page(&Bill::takeaway(23).unwrap()), "Queue 23");

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("size: A4 landscape"));
        assert!(html.contains(r#"data-context="print""#));
        assert_eq!(html.matches(r#"class="receipt receipt-takeaway""#).count(), 6);
        assert_eq!(html.matches(r#"<span class="number-value">23</span>"#).count(), 12);
        assert_eq!(html.matches("divider-dashed\"/>").count(), 6);
        assert_eq!(html.matches("writing-line line-blank").count(), 24);
    }

    #[test]
    fn test_preview_page_scales_tiles() {
        let engine = ReceiptLayoutEngine::default();
        let html = render_page(&engine.preview(&Bill::dine_in(3).unwrap()), "Table 3");

        assert!(html.contains(r#"data-context="preview""#));
        assert!(html.contains("width:133.65mm;height:94.50mm"));
        assert!(html.contains("transform:scale(0.45)"));
        // receipts keep their native size inside the scaled tile
        assert!(html.contains("width:99.00mm;height:105.00mm"));
        assert_eq!(html.matches("writing-line line-blank").count(), 36);
    }

    #[test]
    fn test_text_is_escaped() {
        let options = ReceiptOptions {
            labels: ReceiptLabels::english("Fish & <Chips>"),
            ..ReceiptOptions::default()
        };
        let engine = ReceiptLayoutEngine::new(options);
        let html = render_receipt(&engine.layout(&Bill::dine_in(1).unwrap()));

        assert!(html.contains("Fish &amp; &lt;Chips&gt;"));
        assert!(!html.contains("<Chips>"));
    }
}
