use bytemuck::{Pod, Zeroable};
use glam::Vec3;

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Material {
    pub diffuse: Vec3,
    pub specular_exponent: f32,
    pub specular: Vec3,
    /// 0 or 1
    pub has_texture: u32,
    pub texture_id: u32,
    pub _pad0: u32,
    pub _pad1: u32,
    pub _pad2: u32,
}

impl Material {
    pub fn has_texture(&self) -> bool {
        self.has_texture != 0
    }
}
