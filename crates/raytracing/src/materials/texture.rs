//! Textures compile to self-describing float records: element 0 is the
//! `TextureType` tag and element 1 the total record length, so a reader can
//! skip to the next texture without knowing the layout of this one.
//!
//! ```text
//! constant:       [1, 5, r, g, b]
//! checkerboard:   [2, 12, ra, ga, ba, rb, gb, bb, cos, sin, scale_u, scale_v]
//! image:          [3, 8 + 3 * w * h, cos, sin, scale_u, scale_v, w, h, rgb...]
//! uv:             [4, 2]
//! surface normal: [5, 3, is_tangent_space]
//! ```

use crate::geometry::Vec3;
use crate::materials::ImageTexture;

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureType {
    Constant = 1,
    Checkerboard = 2,
    Image = 3,
    UV = 4,
    SurfaceNormal = 5,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Texture {
    Constant {
        color: Vec3,
    },
    Checkerboard {
        color_a: Vec3,
        color_b: Vec3,
        // rotation of the uv lattice, radians
        rotation: f32,
        scale_u: f32,
        scale_v: f32,
    },
    Image {
        image: ImageTexture,
        rotation: f32,
        scale_u: f32,
        scale_v: f32,
    },
    // visualises texture coordinates as red/green
    UV,
    SurfaceNormal {
        tangent_space: bool,
    },
}

impl Texture {
    pub fn constant(color: Vec3) -> Texture {
        Texture::Constant { color }
    }

    pub fn black() -> Texture {
        Texture::constant(Vec3::zero())
    }

    pub fn checkerboard(color_a: Vec3, color_b: Vec3, scale_u: f32, scale_v: f32) -> Texture {
        Texture::Checkerboard { color_a, color_b, rotation: 0.0, scale_u, scale_v }
    }

    pub fn image(image: ImageTexture) -> Texture {
        Texture::Image { image, rotation: 0.0, scale_u: 1.0, scale_v: 1.0 }
    }

    pub fn texture_type(&self) -> TextureType {
        match self {
            Texture::Constant { .. } => TextureType::Constant,
            Texture::Checkerboard { .. } => TextureType::Checkerboard,
            Texture::Image { .. } => TextureType::Image,
            Texture::UV => TextureType::UV,
            Texture::SurfaceNormal { .. } => TextureType::SurfaceNormal,
        }
    }

    /// Length of the compiled record, header included
    pub fn size(&self) -> usize {
        match self {
            Texture::Constant { .. } => 5,
            Texture::Checkerboard { .. } => 12,
            Texture::Image { image, .. } => 8 + 3 * image.texels().len(),
            Texture::UV => 2,
            Texture::SurfaceNormal { .. } => 3,
        }
    }

    /// Whether a surface using this as its emission texture gives off any light
    pub fn is_emissive(&self) -> bool {
        match self {
            Texture::Constant { color } => !color.is_black(),
            Texture::Checkerboard { color_a, color_b, .. } => !color_a.is_black() || !color_b.is_black(),
            Texture::Image { image, .. } => image.texels().iter().any(|texel| !texel.is_black()),
            Texture::UV | Texture::SurfaceNormal { .. } => false,
        }
    }

    pub fn compile(&self) -> Vec<f32> {
        let mut record = Vec::with_capacity(self.size());
        record.push(self.texture_type() as i32 as f32);
        record.push(self.size() as f32);

        match self {
            Texture::Constant { color } => record.extend_from_slice(&color.to_array()),
            Texture::Checkerboard { color_a, color_b, rotation, scale_u, scale_v } => {
                record.extend_from_slice(&color_a.to_array());
                record.extend_from_slice(&color_b.to_array());
                record.extend_from_slice(&[rotation.cos(), rotation.sin(), *scale_u, *scale_v]);
            }
            Texture::Image { image, rotation, scale_u, scale_v } => {
                record.extend_from_slice(&[rotation.cos(), rotation.sin(), *scale_u, *scale_v]);
                record.extend_from_slice(&[image.width() as f32, image.height() as f32]);
                for texel in image.texels() {
                    record.extend_from_slice(&texel.to_array());
                }
            }
            Texture::UV => {}
            Texture::SurfaceNormal { tangent_space } => record.push(if *tangent_space { 1.0 } else { 0.0 }),
        }

        debug_assert_eq!(record.len(), self.size());
        record
    }
}
