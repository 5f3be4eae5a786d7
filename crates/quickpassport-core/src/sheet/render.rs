//! Sheet rasterization and export.
//!
//! Rendering happens in two phases: every tile image is loaded first, then
//! the whole page is drawn in one synchronous pass. A tile is therefore never
//! drawn before its pixels are available, and a decode failure aborts the
//! render before anything is written.

use std::collections::HashMap;
use std::future::Future;
use std::pin::pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::packer::{pack, LayoutError, PageLayout, Placement, SheetSpec};
use super::slots::{SlotGrid, TileImage};
use crate::decode::{DecodeError, DecodedImage};
use crate::encode::{EncodeError, OutputFormat, CROP_JPEG_QUALITY, SHEET_JPEG_QUALITY};
use crate::raster::{Canvas, RasterSurface, WHITE};

/// Errors from rendering or exporting a sheet.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Nothing to export.
    #[error("The sheet has no photos")]
    EmptySheet,

    /// The sheet spec cannot be laid out.
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// A tile image could not be decoded.
    #[error("Failed to decode tile: {0}")]
    Decode(#[from] DecodeError),

    /// The finished page could not be encoded.
    #[error("Failed to encode sheet: {0}")]
    Encode(#[from] EncodeError),
}

/// Output settings for crops and sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// JPEG quality of the finished sheet.
    pub sheet_quality: u8,
    /// JPEG quality of a single cropped photo.
    pub crop_quality: u8,
    /// Prefix of the exported file name.
    pub product: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            sheet_quality: SHEET_JPEG_QUALITY,
            crop_quality: CROP_JPEG_QUALITY,
            product: "QuickPassport".to_string(),
        }
    }
}

/// File name for an exported sheet, e.g. `QuickPassport_A4_Sheet_1700000000000.jpg`.
pub fn sheet_file_name(product: &str, timestamp_millis: i64) -> String {
    format!("{product}_A4_Sheet_{timestamp_millis}.jpg")
}

/// Source of decoded tile pixels.
///
/// Implementations may decode on another thread or fetch from a cache; the
/// renderer only requires that the future resolves to the full raster.
pub trait TileLoader {
    fn load(&self, image: &TileImage) -> impl Future<Output = Result<Arc<DecodedImage>, DecodeError>>;
}

/// Decodes tiles on the calling thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineDecoder;

impl TileLoader for InlineDecoder {
    fn load(&self, image: &TileImage) -> impl Future<Output = Result<Arc<DecodedImage>, DecodeError>> {
        std::future::ready(image.decode())
    }
}

/// A placement paired with its decoded pixels.
#[derive(Debug, Clone)]
pub struct LoadedTile {
    pub placement: Placement,
    pub image: Arc<DecodedImage>,
}

/// A finished, encoded sheet.
#[derive(Debug, Clone)]
pub struct SheetExport {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub file_name: String,
    pub placements: Vec<Placement>,
}

/// Key shared by all copies of one encoded buffer.
fn encoded_key(image: &TileImage) -> Option<usize> {
    match image {
        TileImage::Encoded(bytes) => Some(bytes.as_ptr() as usize),
        TileImage::Decoded(_) => None,
    }
}

/// Load the pixels for every placement.
///
/// Copies sharing one encoded buffer are decoded once.
pub async fn load_tiles<L: TileLoader>(
    grid: &SlotGrid,
    placements: &[Placement],
    loader: &L,
) -> Result<Vec<LoadedTile>, DecodeError> {
    let mut decoded: HashMap<usize, Arc<DecodedImage>> = HashMap::new();
    let mut tiles = Vec::with_capacity(placements.len());

    for placement in placements {
        let Some(entry) = grid.slots().get(placement.slot_index).and_then(Option::as_ref) else {
            continue;
        };

        let key = encoded_key(&entry.image);
        let cached = key.and_then(|k| decoded.get(&k).cloned());
        let image = match cached {
            Some(image) => image,
            None => {
                let image = loader.load(&entry.image).await?;
                if let Some(k) = key {
                    decoded.insert(k, Arc::clone(&image));
                }
                image
            }
        };

        tiles.push(LoadedTile {
            placement: *placement,
            image,
        });
    }

    Ok(tiles)
}

/// Load every tile synchronously, decoding each shared buffer once.
pub fn load_tiles_blocking(grid: &SlotGrid, placements: &[Placement]) -> Result<Vec<LoadedTile>, DecodeError> {
    // InlineDecoder never suspends, so one poll drives the load to completion.
    let mut future = pin!(load_tiles(grid, placements, &InlineDecoder));
    match future.as_mut().poll(&mut Context::from_waker(Waker::noop())) {
        Poll::Ready(result) => result,
        Poll::Pending => Err(DecodeError::CorruptedFile("tile decode did not complete".to_string())),
    }
}

/// Paint the page: white background, then each tile stretched to its box.
pub fn draw_sheet<S: RasterSurface>(surface: &mut S, tiles: &[LoadedTile]) {
    surface.fill_background(WHITE);
    for tile in tiles {
        surface.draw_image_scaled_at(&tile.image, tile.placement.rect());
    }
}

/// Pack, load and draw `grid` onto `surface`.
///
/// The surface is normally `layout.page_width x layout.page_height`; tiles
/// past its edges are clipped.
pub async fn render_sheet<S, L>(
    grid: &SlotGrid,
    layout: &PageLayout,
    surface: &mut S,
    loader: &L,
) -> Result<Vec<Placement>, DecodeError>
where
    S: RasterSurface,
    L: TileLoader,
{
    let placements = pack(grid, layout);
    let tiles = load_tiles(grid, &placements, loader).await?;
    draw_sheet(surface, &tiles);
    Ok(placements)
}

/// Synchronous [`render_sheet`].
pub fn render_sheet_blocking<S: RasterSurface>(
    grid: &SlotGrid,
    layout: &PageLayout,
    surface: &mut S,
) -> Result<Vec<Placement>, DecodeError> {
    let placements = pack(grid, layout);
    let tiles = load_tiles_blocking(grid, &placements)?;
    draw_sheet(surface, &tiles);
    Ok(placements)
}

/// Render the sheet at the spec's resolution and encode it as JPEG.
pub async fn export_sheet<L: TileLoader>(
    grid: &SlotGrid,
    spec: &SheetSpec,
    settings: &ExportSettings,
    loader: &L,
    timestamp_millis: i64,
) -> Result<SheetExport, ExportError> {
    if grid.is_empty() {
        return Err(ExportError::EmptySheet);
    }
    let layout = spec.checked_layout()?;
    let placements = pack(grid, &layout);
    let tiles = load_tiles(grid, &placements, loader).await?;
    finish_export(&layout, placements, &tiles, settings, timestamp_millis)
}

/// Synchronous [`export_sheet`].
pub fn export_sheet_blocking(
    grid: &SlotGrid,
    spec: &SheetSpec,
    settings: &ExportSettings,
    timestamp_millis: i64,
) -> Result<SheetExport, ExportError> {
    if grid.is_empty() {
        return Err(ExportError::EmptySheet);
    }
    let layout = spec.checked_layout()?;
    let placements = pack(grid, &layout);
    let tiles = load_tiles_blocking(grid, &placements)?;
    finish_export(&layout, placements, &tiles, settings, timestamp_millis)
}

fn finish_export(
    layout: &PageLayout,
    placements: Vec<Placement>,
    tiles: &[LoadedTile],
    settings: &ExportSettings,
    timestamp_millis: i64,
) -> Result<SheetExport, ExportError> {
    let mut canvas = Canvas::new(layout.page_width, layout.page_height);
    draw_sheet(&mut canvas, tiles);
    let bytes = canvas.encode(OutputFormat::Jpeg {
        quality: settings.sheet_quality,
    })?;

    let export = SheetExport {
        bytes,
        width: layout.page_width,
        height: layout.page_height,
        file_name: sheet_file_name(&settings.product, timestamp_millis),
        placements,
    };
    tracing::info!(
        tiles = tiles.len(),
        width = export.width,
        height = export.height,
        bytes = export.bytes.len(),
        file = %export.file_name,
        "sheet exported"
    );
    Ok(export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::catalog::PhotoSize;
    use crate::decode::decode_image;
    use crate::encode::encode_png;
    use crate::units::{PRINT_DPI, SCREEN_DPI};

    const RED: [u8; 3] = [200, 30, 30];

    fn size(id: &str) -> &'static PhotoSize {
        PhotoSize::by_id(id).unwrap()
    }

    fn grid_with(image: TileImage, id: &str, count: usize) -> SlotGrid {
        let mut grid = SlotGrid::new();
        grid.add_many(image, size(id), count);
        grid
    }

    /// Loader that yields before every decode and counts calls.
    #[derive(Default)]
    struct YieldingLoader {
        calls: Cell<usize>,
    }

    impl TileLoader for YieldingLoader {
        fn load(&self, image: &TileImage) -> impl Future<Output = Result<Arc<DecodedImage>, DecodeError>> {
            self.calls.set(self.calls.get() + 1);
            let image = image.clone();
            async move {
                tokio::task::yield_now().await;
                image.decode()
            }
        }
    }

    #[test]
    fn test_file_name() {
        assert_eq!(
            sheet_file_name("QuickPassport", 1_700_000_000_000),
            "QuickPassport_A4_Sheet_1700000000000.jpg"
        );
    }

    #[test]
    fn test_default_settings() {
        let settings = ExportSettings::default();
        assert_eq!(settings.sheet_quality, 90);
        assert_eq!(settings.crop_quality, 95);
        assert_eq!(settings.product, "QuickPassport");
    }

    #[test]
    fn test_draw_sheet_places_tiles() {
        let grid = grid_with(DecodedImage::filled(4, 4, RED).into(), "passport_in_std", 2);
        let layout = PageLayout::a4(SCREEN_DPI);
        let mut canvas = Canvas::new(layout.page_width, layout.page_height);
        let placements = render_sheet_blocking(&grid, &layout, &mut canvas).unwrap();

        let img = canvas.image();
        let first = placements[0];
        let second = placements[1];
        assert_eq!(img.pixel(first.x, first.y), Some(RED));
        assert_eq!(img.pixel(first.x + first.width - 1, first.y + first.height - 1), Some(RED));
        // Gap between the tiles stays white
        assert_eq!(img.pixel(first.x + first.width, first.y), Some(WHITE));
        assert_eq!(img.pixel(second.x, second.y), Some(RED));
        // Margin stays white
        assert_eq!(img.pixel(0, 0), Some(WHITE));
    }

    #[test]
    fn test_render_is_idempotent() {
        let mut grid = grid_with(DecodedImage::filled(3, 5, RED).into(), "stamp_in", 4);
        grid.add_many(DecodedImage::filled(2, 2, [0, 90, 0]).into(), size("4r"), 2);
        let layout = PageLayout::a4(SCREEN_DPI);

        let mut a = Canvas::new(layout.page_width, layout.page_height);
        let mut b = Canvas::new(layout.page_width, layout.page_height);
        render_sheet_blocking(&grid, &layout, &mut a).unwrap();
        render_sheet_blocking(&grid, &layout, &mut b).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_async_render_matches_blocking() {
        let png = encode_png(&DecodedImage::filled(6, 6, RED)).unwrap();
        let grid = grid_with(png.into(), "pan_card", 5);
        let layout = PageLayout::a4(SCREEN_DPI);

        let loader = YieldingLoader::default();
        let mut async_canvas = Canvas::new(layout.page_width, layout.page_height);
        render_sheet(&grid, &layout, &mut async_canvas, &loader).await.unwrap();

        let mut sync_canvas = Canvas::new(layout.page_width, layout.page_height);
        render_sheet_blocking(&grid, &layout, &mut sync_canvas).unwrap();

        assert_eq!(async_canvas, sync_canvas);
        // Five copies of one buffer decode once
        assert_eq!(loader.calls.get(), 1);
    }

    #[test]
    fn test_blocking_load_shares_decoded_copies() {
        let png = encode_png(&DecodedImage::filled(3, 3, RED)).unwrap();
        let grid = grid_with(png.into(), "stamp_in", 3);
        let placements = pack(&grid, &PageLayout::a4(SCREEN_DPI));
        let tiles = load_tiles_blocking(&grid, &placements).unwrap();
        assert_eq!(tiles.len(), 3);
        assert!(Arc::ptr_eq(&tiles[0].image, &tiles[2].image));
    }

    #[test]
    fn test_blocking_load_reports_decode_failure() {
        let grid = grid_with(vec![1u8, 2, 3].into(), "stamp_in", 2);
        let placements = pack(&grid, &PageLayout::a4(SCREEN_DPI));
        assert!(load_tiles_blocking(&grid, &placements).is_err());
    }

    #[tokio::test]
    async fn test_export_print_sheet() {
        let grid = grid_with(DecodedImage::filled(8, 8, RED).into(), "passport_in_std", 7);
        let export = export_sheet(
            &grid,
            &SheetSpec::default(),
            &ExportSettings::default(),
            &InlineDecoder,
            42,
        )
        .await
        .unwrap();

        assert_eq!((export.width, export.height), (2480, 3508));
        assert_eq!(export.file_name, "QuickPassport_A4_Sheet_42.jpg");
        assert_eq!(export.placements.len(), 7);
        assert_eq!(export.placements[5].y, 638);

        let decoded = decode_image(&export.bytes).unwrap();
        assert_eq!((decoded.width, decoded.height), (2480, 3508));
        let [r, g, _] = decoded.pixel(300, 300).unwrap();
        assert!(r > 150 && g < 80);
    }

    #[tokio::test]
    async fn test_export_empty_sheet_fails() {
        let result = export_sheet(
            &SlotGrid::new(),
            &SheetSpec::default(),
            &ExportSettings::default(),
            &InlineDecoder,
            0,
        )
        .await;
        assert!(matches!(result, Err(ExportError::EmptySheet)));
    }

    #[tokio::test]
    async fn test_decode_failure_aborts_export() {
        let mut grid = grid_with(DecodedImage::filled(2, 2, RED).into(), "stamp_in", 1);
        grid.add_many(vec![1u8, 2, 3].into(), size("stamp_in"), 1);

        let result = export_sheet(
            &grid,
            &SheetSpec::a4(SCREEN_DPI),
            &ExportSettings::default(),
            &InlineDecoder,
            0,
        )
        .await;
        assert!(matches!(result, Err(ExportError::Decode(_))));
    }

    #[test]
    fn test_blocking_export_at_custom_dpi() {
        let grid = grid_with(DecodedImage::filled(2, 2, RED).into(), "stamp_in", 3);
        let settings = ExportSettings {
            product: "Studio".to_string(),
            ..Default::default()
        };
        let export = export_sheet_blocking(&grid, &SheetSpec::a4(SCREEN_DPI), &settings, 7).unwrap();
        assert_eq!((export.width, export.height), (794, 1123));
        assert_eq!(export.file_name, "Studio_A4_Sheet_7.jpg");
        assert_eq!(&export.bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_export_rejects_unsupported_dpi() {
        let grid = grid_with(DecodedImage::filled(2, 2, RED).into(), "5r", 3);
        let result = export_sheet_blocking(&grid, &SheetSpec::a4(1e9), &ExportSettings::default(), 0);
        assert!(matches!(result, Err(ExportError::Layout(LayoutError::UnsupportedDpi(_)))));
    }

    #[tokio::test]
    async fn test_async_export_rejects_unsupported_dpi() {
        let grid = grid_with(DecodedImage::filled(2, 2, RED).into(), "5r", 1);
        let result = export_sheet(&grid, &SheetSpec::a4(0.0), &ExportSettings::default(), &InlineDecoder, 0).await;
        assert!(matches!(result, Err(ExportError::Layout(_))));
    }

    #[test]
    fn test_layout_is_consistent_across_dpi() {
        let grid = grid_with(DecodedImage::filled(2, 2, RED).into(), "passport_in_std", 7);
        let print = pack(&grid, &PageLayout::a4(PRINT_DPI));
        let screen = pack(&grid, &PageLayout::a4(SCREEN_DPI));
        // Same tiles share the first row at both resolutions
        let print_rows: Vec<_> = print.iter().map(|p| p.y == print[0].y).collect();
        let screen_rows: Vec<_> = screen.iter().map(|p| p.y == screen[0].y).collect();
        assert_eq!(print_rows, screen_rows);
    }
}
