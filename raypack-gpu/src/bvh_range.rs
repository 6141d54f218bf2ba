use core::mem;

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Describes which part of the global node buffer belongs to a single model,
/// together with the model's instance transform.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct BvhRange {
    pub first_node: u32,
    pub node_count: u32,
    pub _pad0: u32,
    pub _pad1: u32,
    pub transform: Mat4,
}

impl BvhRange {
    /// Byte offset of `transform` within this struct.
    pub const TRANSFORM_OFFSET: usize = mem::offset_of!(BvhRange, transform);

    pub fn new(first_node: u32, node_count: u32) -> Self {
        Self {
            first_node,
            node_count,
            _pad0: 0,
            _pad1: 0,
            transform: Mat4::IDENTITY,
        }
    }
}
