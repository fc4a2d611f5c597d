//! # Page Tiling
//!
//! Six copies of one bill on an A4 landscape sheet.
//!
//! ## Grid
//! ```text
//!  297 mm
//!  ┌───────────┬───────────┬───────────┐
//!  │  tile 0   │  tile 1   │  tile 2   │  105 mm
//!  │  99 mm    │           │           │
//!  ├───────────┼───────────┼───────────┤  210 mm
//!  │  tile 3   │  tile 4   │  tile 5   │
//!  │           │           │           │
//!  └───────────┴───────────┴───────────┘
//! ```
//!
//! Geometry is computed once in millimetres at native size, then multiplied
//! by the context scale. A preview page is therefore exactly the print page
//! shrunk by a single factor; nothing is laid out twice.

use serde::Serialize;

use super::ReceiptLayout;

/// Columns on a page.
pub const TILE_COLUMNS: usize = 3;

/// Rows on a page.
pub const TILE_ROWS: usize = 2;

/// Copies per page.
pub const TILES_PER_PAGE: usize = TILE_COLUMNS * TILE_ROWS;

/// On-screen scale used when none is configured.
pub const DEFAULT_PREVIEW_SCALE: f64 = 0.45;

/// Physical sheet size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    /// ISO A4, long edge horizontal.
    pub const A4_LANDSCAPE: PageSize = PageSize {
        width_mm: 297.0,
        height_mm: 210.0,
    };

    pub fn scaled(&self, scale: f64) -> PageSize {
        PageSize {
            width_mm: self.width_mm * scale,
            height_mm: self.height_mm * scale,
        }
    }
}

/// Where a page is going.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "context", rename_all = "snake_case")]
pub enum RenderContext {
    /// Shrunk to fit next to the controls.
    Preview { scale: f64 },
    /// Actual size, one tile per physical bill.
    Print,
}

impl RenderContext {
    pub fn scale(&self) -> f64 {
        match self {
            RenderContext::Preview { scale } => *scale,
            RenderContext::Print => 1.0,
        }
    }

    pub fn is_print(&self) -> bool {
        matches!(self, RenderContext::Print)
    }
}

/// Axis-aligned rectangle in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn scaled(&self, scale: f64) -> Rect {
        Rect {
            x: self.x * scale,
            y: self.y * scale,
            width: self.width * scale,
            height: self.height * scale,
        }
    }
}

/// One copy of the bill on the page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tile {
    /// 0..TILES_PER_PAGE, row-major.
    pub index: usize,
    pub row: usize,
    pub column: usize,
    /// Native-size frame (millimetres on paper).
    pub native: Rect,
    /// Frame after the context scale.
    pub frame: Rect,
    pub receipt: ReceiptLayout,
}

/// A full sheet of tiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TiledPage {
    pub context: RenderContext,
    /// Native sheet size.
    pub page: PageSize,
    pub tiles: Vec<Tile>,
}

impl TiledPage {
    pub fn scale(&self) -> f64 {
        self.context.scale()
    }

    /// Sheet size after scaling.
    pub fn scaled_page(&self) -> PageSize {
        self.page.scaled(self.scale())
    }

    /// Native size of a single tile.
    pub fn tile_size(&self) -> (f64, f64) {
        tile_size(&self.page)
    }
}

fn tile_size(page: &PageSize) -> (f64, f64) {
    (
        page.width_mm / TILE_COLUMNS as f64,
        page.height_mm / TILE_ROWS as f64,
    )
}

/// Replicates `layout` into the 3 × 2 grid of an A4 landscape sheet.
pub fn tile(layout: &ReceiptLayout, context: RenderContext) -> TiledPage {
    tile_on(layout, PageSize::A4_LANDSCAPE, context)
}

/// Same as [`tile`] on an arbitrary sheet.
pub fn tile_on(layout: &ReceiptLayout, page: PageSize, context: RenderContext) -> TiledPage {
    let (width, height) = tile_size(&page);
    let scale = context.scale();

    let tiles = (0..TILES_PER_PAGE)
        .map(|index| {
            let row = index / TILE_COLUMNS;
            let column = index % TILE_COLUMNS;
            let native = Rect {
                x: column as f64 * width,
                y: row as f64 * height,
                width,
                height,
            };
            Tile {
                index,
                row,
                column,
                native,
                frame: native.scaled(scale),
                receipt: layout.clone(),
            }
        })
        .collect();

    TiledPage {
        context,
        page,
        tiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::{PanelRole, ReceiptLayoutEngine};
    use crate::types::Bill;

    #[test]
    fn test_six_tiles_in_grid() {
        let engine = ReceiptLayoutEngine::default();
        let page = engine.print_page(&Bill::dine_in(4).unwrap());

        assert_eq!(page.tiles.len(), 6);
        let positions: Vec<(usize, usize)> =
            page.tiles.iter().map(|t| (t.row, t.column)).collect();
        assert_eq!(
            positions,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
        assert_eq!(page.tile_size(), (99.0, 105.0));
        assert_eq!(page.tiles[5].native.x, 198.0);
        assert_eq!(page.tiles[5].native.y, 105.0);
    }

    #[test]
    fn test_takeaway_tiles_show_number_in_both_panels() {
        let engine = ReceiptLayoutEngine::default();
        let page = engine.print_page(&Bill::takeaway(23).unwrap());

        let first = &page.tiles[0].receipt;
        for tile in &page.tiles {
            assert_eq!(&tile.receipt, first);
            assert_eq!(
                tile.receipt.panel(PanelRole::CustomerCopy).unwrap().numbers(),
                vec![23]
            );
            assert_eq!(
                tile.receipt.panel(PanelRole::ShopCopy).unwrap().numbers(),
                vec![23]
            );
        }
    }

    #[test]
    fn test_preview_is_print_scaled() {
        let engine = ReceiptLayoutEngine::default();
        let bill = Bill::takeaway(8).unwrap();
        let print = engine.print_page(&bill);
        let preview = engine.preview(&bill);

        assert_eq!(print.scale(), 1.0);
        assert_eq!(preview.scale(), DEFAULT_PREVIEW_SCALE);
        assert_eq!(preview.scaled_page(), print.page.scaled(DEFAULT_PREVIEW_SCALE));

        for (p, q) in print.tiles.iter().zip(&preview.tiles) {
            assert_eq!(p.native, q.native);
            assert_eq!(p.frame, p.native);
            assert_eq!(q.frame, p.frame.scaled(DEFAULT_PREVIEW_SCALE));
            assert_eq!(p.receipt, q.receipt);
        }
    }

    #[test]
    fn test_custom_preview_scale() {
        let engine = ReceiptLayoutEngine::default().with_preview_scale(0.75);
        let page = engine.preview(&Bill::dine_in(1).unwrap());
        assert_eq!(page.context, RenderContext::Preview { scale: 0.75 });
        assert!(!page.context.is_print());
    }
}
