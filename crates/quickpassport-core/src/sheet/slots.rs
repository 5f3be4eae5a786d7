//! Fixed-capacity slot grid holding the tiles placed on the sheet.
//!
//! The grid always has [`MAX_SLOTS`] positions. Each position is either
//! empty or holds one [`SlotEntry`]. Slot order is layout order: the packer
//! walks slots by index, so swapping two slots moves tiles on the page.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::catalog::PhotoSize;
use crate::decode::{decode_image, DecodeError, DecodedImage};

/// Number of slots on one sheet.
pub const MAX_SLOTS: usize = 30;

/// Errors from slot operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    /// Slot index outside the grid.
    #[error("Invalid slot index {index}: grid has {len} slots")]
    InvalidIndex { index: usize, len: usize },
}

/// Identity of one placed copy. Unique within a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tile-{}", self.0)
    }
}

/// Pixel data for a tile.
///
/// Copies added together share one buffer.
#[derive(Debug, Clone)]
pub enum TileImage {
    /// Already decoded raster.
    Decoded(Arc<DecodedImage>),
    /// Encoded JPEG/PNG bytes, decoded when the sheet is rendered.
    Encoded(Arc<[u8]>),
}

impl TileImage {
    /// Decode the tile, or hand back the shared raster if it already is one.
    pub fn decode(&self) -> Result<Arc<DecodedImage>, DecodeError> {
        match self {
            TileImage::Decoded(image) => Ok(Arc::clone(image)),
            TileImage::Encoded(bytes) => decode_image(bytes).map(Arc::new),
        }
    }
}

impl From<DecodedImage> for TileImage {
    fn from(image: DecodedImage) -> Self {
        TileImage::Decoded(Arc::new(image))
    }
}

impl From<Arc<DecodedImage>> for TileImage {
    fn from(image: Arc<DecodedImage>) -> Self {
        TileImage::Decoded(image)
    }
}

impl From<Vec<u8>> for TileImage {
    fn from(bytes: Vec<u8>) -> Self {
        TileImage::Encoded(bytes.into())
    }
}

/// One tile in the grid: an image and the physical size it was cropped to.
#[derive(Debug, Clone)]
pub struct SlotEntry {
    pub id: EntryId,
    pub image: TileImage,
    pub size: PhotoSize,
}

/// Clamp a requested number of copies to what fits in the grid.
///
/// Never returns less than 1, even when the grid is full; adding to a full
/// grid then simply places nothing.
pub fn clamp_quantity(requested: usize, occupied: usize) -> usize {
    requested.min(MAX_SLOTS.saturating_sub(occupied)).max(1)
}

/// The ordered slot grid.
#[derive(Debug, Clone)]
pub struct SlotGrid {
    slots: Vec<Option<SlotEntry>>,
    next_id: u64,
}

impl Default for SlotGrid {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotGrid {
    /// An empty grid of [`MAX_SLOTS`] slots.
    pub fn new() -> Self {
        Self {
            slots: vec![None; MAX_SLOTS],
            next_id: 0,
        }
    }

    /// Total number of slots.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn free_count(&self) -> usize {
        self.capacity() - self.occupied_count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// All slots in index order.
    pub fn slots(&self) -> &[Option<SlotEntry>] {
        &self.slots
    }

    /// Occupied slots in index order, with their indices.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, &SlotEntry)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|entry| (i, entry)))
    }

    /// The entry at `index`, if any.
    pub fn get(&self, index: usize) -> Result<Option<&SlotEntry>, SlotError> {
        self.check(index)?;
        Ok(self.slots[index].as_ref())
    }

    /// Place up to `count` copies of `image` in the lowest free slots.
    ///
    /// Returns how many were placed. Copies that don't fit are dropped.
    pub fn add_many(&mut self, image: TileImage, size: &PhotoSize, count: usize) -> usize {
        let mut placed = 0;
        for slot in self.slots.iter_mut() {
            if placed == count {
                break;
            }
            if slot.is_none() {
                *slot = Some(SlotEntry {
                    id: EntryId(self.next_id),
                    image: image.clone(),
                    size: *size,
                });
                self.next_id += 1;
                placed += 1;
            }
        }

        if placed < count {
            tracing::warn!(
                requested = count,
                placed,
                dropped = count - placed,
                "slot grid full, extra copies dropped"
            );
        } else {
            tracing::debug!(size = size.id, placed, "tiles added");
        }
        placed
    }

    /// Empty the slot at `index`, returning what was there.
    pub fn remove(&mut self, index: usize) -> Result<Option<SlotEntry>, SlotError> {
        self.check(index)?;
        Ok(self.slots[index].take())
    }

    /// Exchange the contents of two slots. Either may be empty.
    pub fn swap(&mut self, i: usize, j: usize) -> Result<(), SlotError> {
        self.check(i)?;
        self.check(j)?;
        self.slots.swap(i, j);
        Ok(())
    }

    /// Empty every slot.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
    }

    fn check(&self, index: usize) -> Result<(), SlotError> {
        if index < self.slots.len() {
            Ok(())
        } else {
            Err(SlotError::InvalidIndex {
                index,
                len: self.slots.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tile() -> TileImage {
        DecodedImage::filled(2, 2, [10, 20, 30]).into()
    }

    fn std_size() -> PhotoSize {
        *PhotoSize::by_id("passport_in_std").unwrap()
    }

    fn ids(grid: &SlotGrid) -> Vec<Option<EntryId>> {
        grid.slots().iter().map(|s| s.as_ref().map(|e| e.id)).collect()
    }

    #[test]
    fn test_new_grid_is_empty() {
        let grid = SlotGrid::new();
        assert_eq!(grid.capacity(), MAX_SLOTS);
        assert_eq!(grid.occupied_count(), 0);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_add_many_fills_lowest_free() {
        let mut grid = SlotGrid::new();
        assert_eq!(grid.add_many(tile(), &std_size(), 3), 3);
        grid.remove(1).unwrap();

        assert_eq!(grid.add_many(tile(), &std_size(), 2), 2);
        assert!(grid.get(1).unwrap().is_some());
        assert!(grid.get(3).unwrap().is_some());
        assert!(grid.get(4).unwrap().is_none());
    }

    #[test]
    fn test_add_many_assigns_unique_ids() {
        let mut grid = SlotGrid::new();
        grid.add_many(tile(), &std_size(), 5);
        let mut seen: Vec<_> = grid.occupied().map(|(_, e)| e.id).collect();
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 5);
    }

    #[test]
    fn test_add_many_shares_pixels() {
        let mut grid = SlotGrid::new();
        let image = Arc::new(DecodedImage::filled(2, 2, [1, 2, 3]));
        grid.add_many(Arc::clone(&image).into(), &std_size(), 4);
        // One reference held here, four by the grid
        assert_eq!(Arc::strong_count(&image), 5);
    }

    #[test]
    fn test_add_many_truncates_when_full() {
        let mut grid = SlotGrid::new();
        assert_eq!(grid.add_many(tile(), &std_size(), 28), 28);
        assert_eq!(grid.add_many(tile(), &std_size(), 5), 2);
        assert_eq!(grid.occupied_count(), MAX_SLOTS);
        assert_eq!(grid.add_many(tile(), &std_size(), 1), 0);
    }

    #[test]
    fn test_add_zero_is_noop() {
        let mut grid = SlotGrid::new();
        assert_eq!(grid.add_many(tile(), &std_size(), 0), 0);
        assert!(grid.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut grid = SlotGrid::new();
        grid.add_many(tile(), &std_size(), 2);
        let removed = grid.remove(0).unwrap();
        assert_eq!(removed.map(|e| e.id), Some(EntryId(0)));
        assert_eq!(grid.occupied_count(), 1);

        // Removing an empty slot is fine
        assert!(grid.remove(0).unwrap().is_none());
    }

    #[test]
    fn test_out_of_bounds() {
        let mut grid = SlotGrid::new();
        let err = SlotError::InvalidIndex { index: 30, len: 30 };
        assert_eq!(grid.remove(30).unwrap_err(), err);
        assert_eq!(grid.swap(0, 30).unwrap_err(), err);
        assert_eq!(grid.swap(30, 0).unwrap_err(), err);
        assert!(grid.get(30).is_err());
    }

    #[test]
    fn test_swap_with_empty() {
        let mut grid = SlotGrid::new();
        grid.add_many(tile(), &std_size(), 1);
        grid.swap(0, 10).unwrap();
        assert!(grid.get(0).unwrap().is_none());
        assert_eq!(grid.get(10).unwrap().map(|e| e.id), Some(EntryId(0)));
    }

    #[test]
    fn test_swap_same_index() {
        let mut grid = SlotGrid::new();
        grid.add_many(tile(), &std_size(), 1);
        let before = ids(&grid);
        grid.swap(0, 0).unwrap();
        assert_eq!(ids(&grid), before);
    }

    #[test]
    fn test_clear() {
        let mut grid = SlotGrid::new();
        grid.add_many(tile(), &std_size(), 7);
        grid.clear();
        assert!(grid.is_empty());
        assert_eq!(grid.capacity(), MAX_SLOTS);
    }

    #[test]
    fn test_readd_gets_new_identity() {
        let mut grid = SlotGrid::new();
        grid.add_many(tile(), &std_size(), 3);
        let old = grid.remove(1).unwrap().map(|e| e.id);
        grid.add_many(tile(), &std_size(), 1);

        assert_eq!(grid.occupied_count(), 3);
        let new = grid.get(1).unwrap().map(|e| e.id);
        assert!(new.is_some());
        assert_ne!(new, old);
    }

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(5, 0), 5);
        assert_eq!(clamp_quantity(5, 28), 2);
        assert_eq!(clamp_quantity(0, 0), 1);
        assert_eq!(clamp_quantity(3, MAX_SLOTS), 1);
    }

    #[test]
    fn test_encoded_tile_decodes() {
        let png = crate::encode::encode_png(&DecodedImage::filled(3, 2, [7, 8, 9])).unwrap();
        let image = TileImage::from(png).decode().unwrap();
        assert_eq!((image.width, image.height), (3, 2));
        assert_eq!(image.pixel(0, 0), Some([7, 8, 9]));
    }

    #[test]
    fn test_corrupt_tile_fails() {
        let bytes = TileImage::from(vec![0u8, 1, 2, 3]);
        assert!(bytes.decode().is_err());
    }

    #[test]
    fn test_entry_id_display() {
        assert_eq!(EntryId(12).to_string(), "tile-12");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
