//! # Receipt Layout Engine
//!
//! Turns a [`Bill`] into a renderer-independent layout, and a layout into a
//! 6-up A4 page.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Bill (mode, number)                                                    │
//! │       │                                                                 │
//! │       ▼  ReceiptLayoutEngine::layout()                                  │
//! │  ReceiptLayout ── DINE_IN: 1 panel  /  TAKEAWAY: 2 panels + divider     │
//! │       │                                                                 │
//! │       ▼  ReceiptLayoutEngine::preview() / print_page()                  │
//! │  TiledPage (A4 landscape, 3 × 2, scale 0.45 or 1.0)                     │
//! │       │                                                                 │
//! │       ├──► html::render_page()   print dialog / browser preview        │
//! │       └──► text::render_page()   terminal preview                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The bill is a numbered placeholder: writing lines and the total field are
//! left blank for the cashier to fill in by hand.

pub mod html;
pub mod template;
pub mod text;
pub mod tiling;

use serde::{Deserialize, Serialize};

use crate::calendar::OperatingZone;
use crate::types::{Bill, BillMode, BillRecord};

pub use template::Template;
pub use tiling::{PageSize, Rect, RenderContext, Tile, TiledPage, DEFAULT_PREVIEW_SCALE};

// =============================================================================
// Labels & Options
// =============================================================================

/// Every piece of fixed text printed on a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptLabels {
    pub restaurant_name: String,
    pub dine_in_badge: String,
    pub table_label: String,
    pub customer_copy_badge: String,
    pub shop_copy_badge: String,
    pub queue_label: String,
    pub total_label: String,
    pub currency_unit: String,
}

impl ReceiptLabels {
    /// English labels, for kitchens that print in English.
    pub fn english(restaurant_name: impl Into<String>) -> Self {
        ReceiptLabels {
            restaurant_name: restaurant_name.into(),
            dine_in_badge: "DINE IN".to_string(),
            table_label: "TABLE".to_string(),
            customer_copy_badge: "CUSTOMER COPY (TAKEAWAY)".to_string(),
            shop_copy_badge: "SHOP COPY".to_string(),
            queue_label: "QUEUE".to_string(),
            total_label: "TOTAL".to_string(),
            currency_unit: "THB".to_string(),
        }
    }
}

impl Default for ReceiptLabels {
    fn default() -> Self {
        ReceiptLabels {
            restaurant_name: "ผัดไทยโบราณหญิงเรือง".to_string(),
            dine_in_badge: "ทานที่ร้าน".to_string(),
            table_label: "เลขโต๊ะ / TABLE".to_string(),
            customer_copy_badge: "ส่วนของลูกค้า (สั่งกลับบ้าน)".to_string(),
            shop_copy_badge: "ส่วนของร้านค้า".to_string(),
            queue_label: "เลขคิว".to_string(),
            total_label: "ราคารวม".to_string(),
            currency_unit: "บาท".to_string(),
        }
    }
}

/// How writing lines are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    /// Plain ruled lines, nothing printed on them.
    #[default]
    Blank,
    /// Dotted leader lines.
    Dotted,
}

/// Presentation switches that do not change what a bill means.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReceiptOptions {
    pub labels: ReceiptLabels,
    pub line_style: LineStyle,
    /// Print the issue time at the bottom (only for logged bills).
    pub show_issued_at: bool,
}

// =============================================================================
// Layout Model
// =============================================================================

/// Relative text size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emphasis {
    Normal,
    Large,
    Huge,
}

/// One element of a panel, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    /// Restaurant name.
    Title { text: String, emphasis: Emphasis },
    /// Boxed mode/copy badge.
    Badge { text: String },
    /// Table or queue number with its caption.
    Number {
        label: Option<String>,
        value: u32,
        emphasis: Emphasis,
    },
    /// Empty lines for writing the order by hand.
    WritingLines { count: u8, style: LineStyle },
    /// "Total ______ unit", amount left blank.
    TotalField { label: String, unit: String },
    /// Small print at the bottom.
    Footer { text: String },
}

/// What a panel is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PanelRole {
    /// The only panel of a dine-in bill.
    Single,
    /// Torn off and handed to the takeaway customer.
    CustomerCopy,
    /// Kept at the counter.
    ShopCopy,
}

/// A vertical section of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Panel {
    pub role: PanelRole,
    pub blocks: Vec<Block>,
}

impl Panel {
    /// Every number printed in this panel.
    pub fn numbers(&self) -> Vec<u32> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Number { value, .. } => Some(*value),
                _ => None,
            })
            .collect()
    }

    /// Total writing lines in this panel.
    pub fn writing_lines(&self) -> u32 {
        self.blocks
            .iter()
            .map(|block| match block {
                Block::WritingLines { count, .. } => u32::from(*count),
                _ => 0,
            })
            .sum()
    }

    pub fn has_total_field(&self) -> bool {
        self.blocks
            .iter()
            .any(|block| matches!(block, Block::TotalField { .. }))
    }
}

/// Line drawn between two panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DividerStyle {
    /// Tear-off line.
    Dashed,
    Solid,
}

/// A single bill, ready to be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptLayout {
    pub bill: Bill,
    pub template: Template,
    pub panels: Vec<Panel>,
    /// Divider between consecutive panels, if there is more than one.
    pub divider: Option<DividerStyle>,
}

impl ReceiptLayout {
    /// Finds the panel with `role`.
    pub fn panel(&self, role: PanelRole) -> Option<&Panel> {
        self.panels.iter().find(|panel| panel.role == role)
    }
}

// =============================================================================
// Engine
// =============================================================================

/// Builds receipt layouts and tiled pages.
///
/// ## Example
/// ```rust
/// use queuebill_core::receipt::{PanelRole, ReceiptLayoutEngine};
/// use queuebill_core::Bill;
///
/// let engine = ReceiptLayoutEngine::default();
/// let page = engine.print_page(&Bill::takeaway(23).unwrap());
///
/// assert_eq!(page.tiles.len(), 6);
/// for tile in &page.tiles {
///     assert_eq!(tile.receipt.panel(PanelRole::CustomerCopy).unwrap().numbers(), vec![23]);
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ReceiptLayoutEngine {
    options: ReceiptOptions,
    zone: OperatingZone,
    preview_scale: Option<f64>,
}

impl ReceiptLayoutEngine {
    pub fn new(options: ReceiptOptions) -> Self {
        ReceiptLayoutEngine {
            options,
            zone: OperatingZone::default(),
            preview_scale: None,
        }
    }

    /// Zone used for the issued-at footer.
    pub fn with_zone(mut self, zone: OperatingZone) -> Self {
        self.zone = zone;
        self
    }

    /// Overrides the on-screen preview scale.
    pub fn with_preview_scale(mut self, scale: f64) -> Self {
        self.preview_scale = Some(scale);
        self
    }

    /// Layout of a bill that has not been logged yet.
    pub fn layout(&self, bill: &Bill) -> ReceiptLayout {
        Template::for_mode(bill.mode()).build(bill, &self.options, None)
    }

    /// Layout of a logged bill; carries the issued-at footer when enabled.
    pub fn layout_record(&self, record: &BillRecord) -> Option<ReceiptLayout> {
        let bill = record.bill().ok()?;
        let footer = self.options.show_issued_at.then(|| {
            format!(
                "{} {}",
                self.zone.date_of(&record.issued_at).format("%d/%m/%Y"),
                self.zone.clock_label(&record.issued_at)
            )
        });
        Some(Template::for_mode(bill.mode()).build(&bill, &self.options, footer))
    }

    /// On-screen page for the bill the operator is looking at.
    pub fn preview(&self, bill: &Bill) -> TiledPage {
        let scale = self.preview_scale.unwrap_or(DEFAULT_PREVIEW_SCALE);
        tiling::tile(&self.layout(bill), RenderContext::Preview { scale })
    }

    /// Full-size page for the printer.
    pub fn print_page(&self, bill: &Bill) -> TiledPage {
        tiling::tile(&self.layout(bill), RenderContext::Print)
    }

    /// Full-size page for a logged bill.
    pub fn print_record(&self, record: &BillRecord) -> Option<TiledPage> {
        self.layout_record(record)
            .map(|layout| tiling::tile(&layout, RenderContext::Print))
    }
}

/// Label used in history rows and toasts.
pub fn mode_caption(mode: BillMode) -> &'static str {
    match mode {
        BillMode::DineIn => "Table",
        BillMode::Takeaway => "Queue",
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn test_layout_follows_mode() {
        let engine = ReceiptLayoutEngine::default();
        let dine_in = engine.layout(&Bill::dine_in(3).unwrap());
        assert_eq!(dine_in.template, Template::DineIn);
        assert_eq!(dine_in.panels.len(), 1);
        assert_eq!(dine_in.divider, None);

        let takeaway = engine.layout(&Bill::takeaway(3).unwrap());
        assert_eq!(takeaway.template, Template::Takeaway);
        assert_eq!(takeaway.panels.len(), 2);
        assert_eq!(takeaway.divider, Some(DividerStyle::Dashed));
    }

    #[test]
    fn test_footer_only_when_enabled() {
        let record = BillRecord {
            id: "r1".to_string(),
            mode: BillMode::DineIn,
            number: 5,
            issued_at: Utc.with_ymd_and_hms(2026, 10, 19, 2, 5, 0).unwrap(),
        };
        let zone = OperatingZone::Fixed(FixedOffset::east_opt(7 * 3600).unwrap());

        let plain = ReceiptLayoutEngine::default().with_zone(zone);
        let layout = plain.layout_record(&record).unwrap();
        assert!(!layout.panels[0]
            .blocks
            .iter()
            .any(|b| matches!(b, Block::Footer { .. })));

        let stamped = ReceiptLayoutEngine::new(ReceiptOptions {
            show_issued_at: true,
            line_style: LineStyle::Dotted,
            ..ReceiptOptions::default()
        })
        .with_zone(zone);
        let layout = stamped.layout_record(&record).unwrap();
        assert_eq!(
            layout.panels[0].blocks.last(),
            Some(&Block::Footer {
                text: "19/10/2026 09:05".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_record_has_no_layout() {
        let record = BillRecord {
            id: "r1".to_string(),
            mode: BillMode::DineIn,
            number: 42,
            issued_at: Utc::now(),
        };
        assert!(ReceiptLayoutEngine::default().layout_record(&record).is_none());
    }
}
