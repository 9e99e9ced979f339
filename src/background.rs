use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::BackgroundError;

/// Decoded background image drawn underneath the strokes
#[derive(Debug, Clone)]
pub struct Background {
    id: Uuid,
    image: Arc<RgbaImage>,
}

impl Background {
    pub fn new(image: RgbaImage) -> Self {
        Self {
            id: Uuid::new_v4(),
            image: Arc::new(image),
        }
    }

    /// Decode any format the `image` crate recognises
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BackgroundError> {
        let decoded = image::load_from_memory(bytes)?;
        log::debug!("Decoded background: {}x{}", decoded.width(), decoded.height());
        Ok(Self::new(decoded.to_rgba8()))
    }

    pub fn from_path(path: &Path) -> Result<Self, BackgroundError> {
        let bytes = std::fs::read(path).map_err(|source| BackgroundError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }

    /// Changes whenever a different image is loaded; used as a texture cache key
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}
