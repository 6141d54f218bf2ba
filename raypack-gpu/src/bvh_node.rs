use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Flat BVH node, as read by the intersection stage.
///
/// `first` is either the index of the node's first child (internal nodes,
/// with the second child right after it) or the index of the node's first
/// triangle (leaves); which one depends on `prim_count`, so the field is
/// private and can only be read through accessors that respect the role.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct BvhNode {
    min: Vec3,
    first: u32,
    max: Vec3,
    prim_count: u32,
}

impl BvhNode {
    pub fn internal(min: Vec3, max: Vec3, first_child: u32) -> Self {
        Self {
            min,
            first: first_child,
            max,
            prim_count: 0,
        }
    }

    pub fn leaf(min: Vec3, max: Vec3, first_prim: u32, prim_count: u32) -> Self {
        assert!(prim_count > 0, "leaf must own at least one primitive");

        Self {
            min,
            first: first_prim,
            max,
            prim_count,
        }
    }

    pub fn min(&self) -> Vec3 {
        self.min
    }

    pub fn max(&self) -> Vec3 {
        self.max
    }

    pub fn is_leaf(&self) -> bool {
        self.prim_count > 0
    }

    pub fn prim_count(&self) -> u32 {
        self.prim_count
    }

    pub fn first_child(&self) -> Option<u32> {
        (!self.is_leaf()).then_some(self.first)
    }

    pub fn first_prim(&self) -> Option<u32> {
        self.is_leaf().then_some(self.first)
    }

    /// Adds `node_offset` to the child pointer of internal nodes and
    /// `triangle_offset` to the primitive pointer of leaves.
    pub fn rebased(mut self, node_offset: u32, triangle_offset: u32) -> Self {
        if self.is_leaf() {
            self.first += triangle_offset;
        } else {
            self.first += node_offset;
        }

        self
    }
}
