use glam::Vec3;

use crate::{TextureCache, TextureError, TextureHandle, TextureId};

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    diffuse: Vec3,
    specular: Vec3,
    specular_exponent: f32,
    texture: Option<MaterialTexture>,
}

impl Material {
    pub fn with_diffuse(mut self, diffuse: Vec3) -> Self {
        self.diffuse = diffuse;
        self
    }

    pub fn with_specular(mut self, specular: Vec3) -> Self {
        self.specular = specular;
        self
    }

    pub fn with_specular_exponent(mut self, specular_exponent: f32) -> Self {
        self.specular_exponent = specular_exponent;
        self
    }

    pub fn with_texture(mut self, texture: Option<MaterialTexture>) -> Self {
        self.texture = texture;
        self
    }

    pub fn diffuse(&self) -> Vec3 {
        self.diffuse
    }

    pub fn specular(&self) -> Vec3 {
        self.specular
    }

    pub fn specular_exponent(&self) -> f32 {
        self.specular_exponent
    }

    pub fn texture(&self) -> Option<MaterialTexture> {
        self.texture
    }

    pub fn has_texture(&self) -> bool {
        self.texture.is_some()
    }

    pub(crate) fn serialize(&self) -> raypack_gpu::Material {
        raypack_gpu::Material {
            diffuse: self.diffuse,
            specular_exponent: self.specular_exponent,
            specular: self.specular,
            has_texture: self.has_texture() as u32,
            texture_id: self.texture.map_or(0, |texture| texture.id.get()),
            ..Default::default()
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Vec3::ONE,
            specular: Vec3::ZERO,
            specular_exponent: 0.0,
            texture: None,
        }
    }
}

/// Drops the texture references held by given materials (one per textured
/// material).
pub(crate) fn release_textures<'a>(
    materials: impl IntoIterator<Item = &'a Material>,
    textures: &mut TextureCache,
) -> Result<(), TextureError> {
    for texture in materials.into_iter().filter_map(Material::texture) {
        textures.release(texture.handle)?;
    }

    Ok(())
}

/// Diffuse texture of a material, as acquired from the
/// [`TextureCache`](crate::TextureCache).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MaterialTexture {
    pub handle: TextureHandle,
    pub id: TextureId,
}
