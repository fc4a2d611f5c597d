//! Receipt templates, one per bill mode.
//!
//! ```text
//!  DINE_IN                          TAKEAWAY
//!  ┌──────────────────────────┐     ┌──────────────────────────┐
//!  │ Restaurant      TABLE    │     │ Restaurant      QUEUE    │
//!  │ [dine-in]         7      │     │ [customer copy]  23      │
//!  │ ________________________ │     ├ - - - - - - - - - - - - -┤
//!  │ ________________________ │     │ [shop copy] / 23     23  │
//!  │        (6 lines)         │     │ ________________________ │
//!  │ ________________________ │     │        (4 lines)         │
//!  │ Total ____________ unit  │     │ Total ____________ unit  │
//!  └──────────────────────────┘     └──────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};

use super::{Block, DividerStyle, Emphasis, Panel, PanelRole, ReceiptLayout, ReceiptOptions};
use crate::types::{Bill, BillMode};

/// Writing lines on a dine-in bill.
pub const DINE_IN_WRITING_LINES: u8 = 6;

/// Writing lines on the shop copy of a takeaway bill.
pub const TAKEAWAY_WRITING_LINES: u8 = 4;

/// Which receipt design a bill uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    DineIn,
    Takeaway,
}

impl Template {
    pub fn for_mode(mode: BillMode) -> Self {
        match mode {
            BillMode::DineIn => Template::DineIn,
            BillMode::Takeaway => Template::Takeaway,
        }
    }

    /// Builds the layout; `footer` is appended to the last panel.
    pub fn build(&self, bill: &Bill, options: &ReceiptOptions, footer: Option<String>) -> ReceiptLayout {
        let mut layout = match self {
            Template::DineIn => dine_in(bill, options),
            Template::Takeaway => takeaway(bill, options),
        };
        if let (Some(text), Some(last)) = (footer, layout.panels.last_mut()) {
            last.blocks.push(Block::Footer { text });
        }
        layout
    }
}

fn dine_in(bill: &Bill, options: &ReceiptOptions) -> ReceiptLayout {
    let labels = &options.labels;
    let panel = Panel {
        role: PanelRole::Single,
        blocks: vec![
            Block::Title {
                text: labels.restaurant_name.clone(),
                emphasis: Emphasis::Large,
            },
            Block::Badge {
                text: labels.dine_in_badge.clone(),
            },
            Block::Number {
                label: Some(labels.table_label.clone()),
                value: bill.number(),
                emphasis: Emphasis::Huge,
            },
            Block::WritingLines {
                count: DINE_IN_WRITING_LINES,
                style: options.line_style,
            },
            Block::TotalField {
                label: labels.total_label.clone(),
                unit: labels.currency_unit.clone(),
            },
        ],
    };

    ReceiptLayout {
        bill: *bill,
        template: Template::DineIn,
        panels: vec![panel],
        divider: None,
    }
}

fn takeaway(bill: &Bill, options: &ReceiptOptions) -> ReceiptLayout {
    let labels = &options.labels;
    let customer = Panel {
        role: PanelRole::CustomerCopy,
        blocks: vec![
            Block::Title {
                text: labels.restaurant_name.clone(),
                emphasis: Emphasis::Normal,
            },
            Block::Badge {
                text: labels.customer_copy_badge.clone(),
            },
            Block::Number {
                label: Some(labels.queue_label.clone()),
                value: bill.number(),
                emphasis: Emphasis::Huge,
            },
        ],
    };

    let shop = Panel {
        role: PanelRole::ShopCopy,
        blocks: vec![
            Block::Badge {
                text: labels.shop_copy_badge.clone(),
            },
            Block::Number {
                label: Some(labels.queue_label.clone()),
                value: bill.number(),
                emphasis: Emphasis::Large,
            },
            Block::WritingLines {
                count: TAKEAWAY_WRITING_LINES,
                style: options.line_style,
            },
            Block::TotalField {
                label: labels.total_label.clone(),
                unit: labels.currency_unit.clone(),
            },
        ],
    };

    ReceiptLayout {
        bill: *bill,
        template: Template::Takeaway,
        panels: vec![customer, shop],
        divider: Some(DividerStyle::Dashed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::LineStyle;

    #[test]
    fn test_dine_in_template() {
        let bill = Bill::dine_in(7).unwrap();
        let layout = Template::DineIn.build(&bill, &ReceiptOptions::default(), None);

        let panel = layout.panel(PanelRole::Single).unwrap();
        assert_eq!(panel.numbers(), vec![7]);
        assert_eq!(panel.writing_lines(), 6);
        assert!(panel.has_total_field());
        assert!(matches!(panel.blocks[0], Block::Title { .. }));
        assert!(matches!(panel.blocks[1], Block::Badge { .. }));
    }

    #[test]
    fn test_takeaway_template() {
        let bill = Bill::takeaway(23).unwrap();
        let layout = Template::Takeaway.build(&bill, &ReceiptOptions::default(), None);

        let customer = layout.panel(PanelRole::CustomerCopy).unwrap();
        assert_eq!(customer.numbers(), vec![23]);
        assert_eq!(customer.writing_lines(), 0);
        assert!(!customer.has_total_field());

        let shop = layout.panel(PanelRole::ShopCopy).unwrap();
        assert_eq!(shop.numbers(), vec![23]);
        assert_eq!(shop.writing_lines(), 4);
        assert!(shop.has_total_field());

        assert_eq!(layout.panels[0].role, PanelRole::CustomerCopy);
        assert_eq!(layout.divider, Some(DividerStyle::Dashed));
    }

    #[test]
    fn test_total_field_is_blank() {
        let bill = Bill::dine_in(2).unwrap();
        let layout = Template::DineIn.build(&bill, &ReceiptOptions::default(), None);
        let total = layout.panels[0]
            .blocks
            .iter()
            .find(|b| matches!(b, Block::TotalField { .. }))
            .unwrap();
        // label and unit only, no amount or date
        assert_eq!(
            total,
            &Block::TotalField {
                label: "ราคารวม".to_string(),
                unit: "บาท".to_string(),
            }
        );
    }

    #[test]
    fn test_line_style_carried_through() {
        let options = ReceiptOptions {
            line_style: LineStyle::Dotted,
            ..ReceiptOptions::default()
        };
        let layout = Template::Takeaway.build(&Bill::takeaway(1).unwrap(), &options, None);
        let shop = layout.panel(PanelRole::ShopCopy).unwrap();
        assert!(shop.blocks.iter().any(|b| matches!(
            b,
            Block::WritingLines {
                style: LineStyle::Dotted,
                ..
            }
        )));
    }
}
