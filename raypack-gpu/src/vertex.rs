use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3};

/// One packed vertex; every triangle corner gets its own one.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub _pad0: f32,
    pub uv: Vec2,
    pub _pad1: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            uv,
            ..Default::default()
        }
    }
}
