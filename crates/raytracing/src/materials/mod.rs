mod image;
mod texture;

pub use image::ImageTexture;
pub use texture::Texture;
pub use texture::TextureType;

/// Shading model of a surface, written as the first element of its compiled record
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    // diffuse base under a glossy dielectric layer
    ClearCoat = 1,
    Glass = 2,
    Lambertian = 3,
    Mirror = 4,
    Phong = 5,
}

/// What a primitive looks like: a material plus the textures that drive it.
///
/// `emission` decides whether the owning primitive counts as a light source;
/// see `Texture::is_emissive`.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub material: Material,
    pub albedo: Texture,
    pub emission: Texture,
    pub normal: Texture,
    pub noise_amount: f32,
    pub noise_scale: f32,
}

impl Surface {
    /// Non-emissive surface without normal mapping or noise
    pub fn new(material: Material, albedo: Texture) -> Surface {
        Surface {
            material,
            albedo,
            emission: Texture::black(),
            normal: Texture::SurfaceNormal { tangent_space: false },
            noise_amount: 0.0,
            noise_scale: 1.0,
        }
    }

    pub fn lambertian(albedo: Texture) -> Surface {
        Surface::new(Material::Lambertian, albedo)
    }

    pub fn with_emission(mut self, emission: Texture) -> Surface {
        self.emission = emission;
        self
    }

    pub fn with_normal(mut self, normal: Texture) -> Surface {
        self.normal = normal;
        self
    }

    pub fn with_noise(mut self, noise_amount: f32, noise_scale: f32) -> Surface {
        self.noise_amount = noise_amount;
        self.noise_scale = noise_scale;
        self
    }

    pub fn is_emissive(&self) -> bool {
        self.emission.is_emissive()
    }

    pub fn textures(&self) -> [&Texture; 3] {
        [&self.albedo, &self.emission, &self.normal]
    }
}
