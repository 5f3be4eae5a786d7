//! Row-based placement of tiles on the page.
//!
//! # Algorithm
//!
//! Greedy shelf packing in slot order:
//!
//! 1. Start a cursor at `(margin, margin)` with an empty row
//! 2. For each occupied slot, if the tile would cross `page_width - margin`,
//!    wrap to `x = margin` and move down by the tallest tile of the row plus the gap
//! 3. Place the tile at the cursor, then advance by its width plus the gap
//!
//! Empty slots take no space. The page height is not enforced: tiles that
//! run past the bottom margin are still placed, and logged.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::slots::SlotGrid;
use crate::catalog::PhotoSize;
use crate::raster::Rect;
use crate::units::{is_supported_dpi, mm_to_px, MAX_DPI, PRINT_DPI};

/// Errors from turning a [`SheetSpec`] into pixels.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Unsupported resolution {0} DPI (must be above 0 and at most {max})", max = MAX_DPI)]
    UnsupportedDpi(f64),
}

/// A4 width in millimeters.
pub const A4_WIDTH_MM: f64 = 210.0;

/// A4 height in millimeters.
pub const A4_HEIGHT_MM: f64 = 297.0;

/// Margin on the left, top and right of the sheet.
pub const SHEET_MARGIN_MM: f64 = 7.0;

/// Space between neighboring tiles, both across and down.
pub const TILE_GAP_MM: f64 = 2.0;

/// Physical sheet configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetSpec {
    pub page_width_mm: f64,
    pub page_height_mm: f64,
    pub margin_mm: f64,
    pub gap_mm: f64,
    pub dpi: f64,
}

impl Default for SheetSpec {
    fn default() -> Self {
        Self {
            page_width_mm: A4_WIDTH_MM,
            page_height_mm: A4_HEIGHT_MM,
            margin_mm: SHEET_MARGIN_MM,
            gap_mm: TILE_GAP_MM,
            dpi: PRINT_DPI,
        }
    }
}

impl SheetSpec {
    /// A4 with the standard margin and gap at the given resolution.
    pub fn a4(dpi: f64) -> Self {
        Self {
            dpi,
            ..Self::default()
        }
    }

    /// Pixel layout, rejecting resolutions outside `(0, MAX_DPI]`.
    pub fn checked_layout(&self) -> Result<PageLayout, LayoutError> {
        if is_supported_dpi(self.dpi) {
            Ok(self.layout())
        } else {
            Err(LayoutError::UnsupportedDpi(self.dpi))
        }
    }

    /// Pixel layout at this spec's resolution.
    ///
    /// Does not check the resolution; see [`SheetSpec::checked_layout`].
    pub fn layout(&self) -> PageLayout {
        PageLayout {
            page_width: mm_to_px(self.page_width_mm, self.dpi),
            page_height: mm_to_px(self.page_height_mm, self.dpi),
            margin: mm_to_px(self.margin_mm, self.dpi),
            gap: mm_to_px(self.gap_mm, self.dpi),
            dpi: self.dpi,
        }
    }
}

/// Page geometry in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageLayout {
    pub page_width: u32,
    pub page_height: u32,
    pub margin: u32,
    pub gap: u32,
    pub dpi: f64,
}

impl PageLayout {
    /// Standard A4 layout at the given resolution.
    pub fn a4(dpi: f64) -> Self {
        SheetSpec::a4(dpi).layout()
    }

    /// Standard A4 layout, rejecting unsupported resolutions.
    pub fn checked_a4(dpi: f64) -> Result<Self, LayoutError> {
        SheetSpec::a4(dpi).checked_layout()
    }

    /// Pixel box of a tile of the given physical size.
    pub fn tile_size(&self, size: &PhotoSize) -> (u32, u32) {
        size.pixel_size(self.dpi)
    }

    /// Tiles of width `tile_width` that fit in one row.
    ///
    /// Matches the packer whenever at least one tile fits between the margins.
    pub fn tiles_per_row(&self, tile_width: u32) -> u32 {
        let usable = self
            .page_width
            .saturating_add(self.gap)
            .saturating_sub(self.margin.saturating_mul(2));
        usable / tile_width.saturating_add(self.gap).max(1)
    }

    /// Rows needed for `count` tiles at `per_row` tiles per row.
    pub fn row_count(count: u32, per_row: u32) -> u32 {
        if per_row == 0 {
            return count;
        }
        count.div_ceil(per_row)
    }
}

/// Where one occupied slot lands on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub slot_index: usize,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Placement {
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.x as f64,
            self.y as f64,
            self.width as f64,
            self.height as f64,
        )
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }
}

/// Place every occupied slot of `grid` on the page.
pub fn pack(grid: &SlotGrid, layout: &PageLayout) -> Vec<Placement> {
    pack_sizes(grid.occupied().map(|(i, entry)| (i, &entry.size)), layout)
}

/// Place a sequence of `(slot_index, size)` tiles on the page, in order.
pub fn pack_sizes<'a, I>(tiles: I, layout: &PageLayout) -> Vec<Placement>
where
    I: IntoIterator<Item = (usize, &'a PhotoSize)>,
{
    let right_limit = layout.page_width.saturating_sub(layout.margin);
    let bottom_limit = layout.page_height.saturating_sub(layout.margin);

    let mut x = layout.margin;
    let mut y = layout.margin;
    let mut row_height = 0u32;
    let mut placements = Vec::new();

    for (slot_index, size) in tiles {
        let (width, height) = layout.tile_size(size);

        if x.saturating_add(width) > right_limit {
            x = layout.margin;
            y = y.saturating_add(row_height).saturating_add(layout.gap);
            row_height = 0;
        }

        let placement = Placement {
            slot_index,
            x,
            y,
            width,
            height,
        };
        if placement.bottom() > bottom_limit {
            tracing::warn!(
                slot = slot_index,
                bottom = placement.bottom(),
                limit = bottom_limit,
                "tile extends past the bottom margin"
            );
        }
        placements.push(placement);

        row_height = row_height.max(height);
        x = x.saturating_add(width).saturating_add(layout.gap);
    }

    placements
}

/// Lowest pixel row used by any placement, including the bottom margin.
///
/// At least the page height; larger when tiles overflow the page.
pub fn content_height(placements: &[Placement], layout: &PageLayout) -> u32 {
    placements
        .iter()
        .map(|p| p.bottom().saturating_add(layout.margin))
        .max()
        .unwrap_or(0)
        .max(layout.page_height)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::catalog::PHOTO_SIZES;
    use proptest::prelude::*;

    proptest! {
        /// Property: For identical tiles, per-row count and row count follow
        /// the closed form.
        #[test]
        fn prop_uniform_tiles_follow_formula(
            size_index in 0usize..PHOTO_SIZES.len(),
            count in 1usize..=30,
        ) {
            let size = &PHOTO_SIZES[size_index];
            let layout = PageLayout::a4(PRINT_DPI);
            let placements = pack_sizes((0..count).map(|i| (i, size)), &layout);

            let (w, _) = layout.tile_size(size);
            let per_row = layout.tiles_per_row(w);
            let first_row = placements.iter().filter(|p| p.y == layout.margin).count();
            prop_assert_eq!(first_row as u32, per_row.min(count as u32));

            let mut rows: Vec<u32> = placements.iter().map(|p| p.y).collect();
            rows.dedup();
            prop_assert_eq!(rows.len() as u32, PageLayout::row_count(count as u32, per_row));
        }

        /// Property: Tiles never overlap and never cross the side margins.
        #[test]
        fn prop_no_overlap(indices in proptest::collection::vec(0usize..PHOTO_SIZES.len(), 0..30)) {
            let layout = PageLayout::a4(PRINT_DPI);
            let tiles = indices.iter().enumerate().map(|(i, &s)| (i, &PHOTO_SIZES[s]));
            let placements = pack_sizes(tiles, &layout);

            for (n, a) in placements.iter().enumerate() {
                prop_assert!(a.x >= layout.margin);
                prop_assert!(a.x + a.width <= layout.page_width - layout.margin);
                for b in &placements[n + 1..] {
                    prop_assert!(!a.rect().intersects(&b.rect()));
                }
            }
        }

        /// Property: Packing is deterministic.
        #[test]
        fn prop_deterministic(indices in proptest::collection::vec(0usize..PHOTO_SIZES.len(), 0..30)) {
            let layout = PageLayout::a4(PRINT_DPI);
            let run = || pack_sizes(indices.iter().enumerate().map(|(i, &s)| (i, &PHOTO_SIZES[s])), &layout);
            prop_assert_eq!(run(), run());
        }
    }
}
