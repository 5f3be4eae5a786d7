use std::sync::Arc;

use quickpassport_core::decode::{DecodeError, DecodedImage};
use quickpassport_core::sheet::{TileImage, TileLoader};

/// Decodes encoded tiles on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingPoolLoader;

impl TileLoader for BlockingPoolLoader {
    async fn load(&self, image: &TileImage) -> Result<Arc<DecodedImage>, DecodeError> {
        match image {
            TileImage::Decoded(decoded) => Ok(Arc::clone(decoded)),
            TileImage::Encoded(_) => {
                let image = image.clone();
                tokio::task::spawn_blocking(move || image.decode())
                    .await
                    .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?
            }
        }
    }
}
