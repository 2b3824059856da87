//! Bitmap payload of an image texture. Texels are linear RGB, row-major,
//! starting at the top-left corner.

use std::sync::Arc;

use crate::geometry::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct ImageTexture {
    width: u32,
    height: u32,
    texels: Arc<[Vec3]>,
}

impl ImageTexture {
    /// Returns `None` unless `texels` holds exactly `width * height` colours
    pub fn new(width: u32, height: u32, texels: Vec<Vec3>) -> Option<ImageTexture> {
        let expected = (width as usize).checked_mul(height as usize)?;
        if texels.len() != expected {
            return None;
        }
        Some(ImageTexture { width, height, texels: texels.into() })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texels(&self) -> &[Vec3] {
        &self.texels
    }

    pub fn texel(&self, x: u32, y: u32) -> Option<Vec3> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.texels.get((y * self.width + x) as usize).copied()
    }
}
