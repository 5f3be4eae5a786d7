//! The print sheet: slot grid, packing and rendering.
//!
//! # Flow
//!
//! 1. Finished photos go into a [`SlotGrid`] with [`SlotGrid::add_many`]
//! 2. [`pack`] turns occupied slots into page positions
//! 3. [`render_sheet`] or [`export_sheet`] draws them onto a white page

mod packer;
mod render;
mod slots;

pub use packer::{
    content_height, pack, pack_sizes, LayoutError, PageLayout, Placement, SheetSpec, A4_HEIGHT_MM,
    A4_WIDTH_MM, SHEET_MARGIN_MM, TILE_GAP_MM,
};
pub use render::{
    draw_sheet, export_sheet, export_sheet_blocking, load_tiles, load_tiles_blocking,
    render_sheet, render_sheet_blocking, sheet_file_name, ExportError, ExportSettings,
    InlineDecoder, LoadedTile, SheetExport, TileLoader,
};
pub use slots::{
    clamp_quantity, EntryId, SlotEntry, SlotError, SlotGrid, TileImage, MAX_SLOTS,
};
