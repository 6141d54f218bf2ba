use super::PrimitivesRef;
use crate::{Axis, BoundingBox};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum BvhNode {
    Internal {
        bounds: BoundingBox,
        first_child: BvhNodeId,
        plane: SplittingPlane,
    },

    Leaf {
        bounds: BoundingBox,
        primitives_ref: PrimitivesRef,
    },

    /// Slot reserved up-front but never claimed as anybody's child.
    #[default]
    Unused,
}

impl BvhNode {
    pub fn bounds(&self) -> BoundingBox {
        match self {
            BvhNode::Internal { bounds, .. } | BvhNode::Leaf { bounds, .. } => {
                *bounds
            }
            BvhNode::Unused => Default::default(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.prim_count() > 0
    }

    pub fn prim_count(&self) -> u32 {
        match self {
            BvhNode::Leaf { primitives_ref, .. } => primitives_ref.len(),
            _ => 0,
        }
    }

    /// Returns the ids of both children, which always sit next to each other.
    pub fn children(&self) -> Option<(BvhNodeId, BvhNodeId)> {
        if let BvhNode::Internal { first_child, .. } = self {
            Some((*first_child, first_child.next()))
        } else {
            None
        }
    }

    pub fn primitives_ref(&self) -> Option<PrimitivesRef> {
        if let BvhNode::Leaf { primitives_ref, .. } = self {
            Some(*primitives_ref)
        } else {
            None
        }
    }

    pub fn plane(&self) -> Option<SplittingPlane> {
        if let BvhNode::Internal { plane, .. } = self {
            Some(*plane)
        } else {
            None
        }
    }

    pub(crate) fn serialize(&self) -> raypack_gpu::BvhNode {
        match self {
            BvhNode::Internal {
                bounds,
                first_child,
                ..
            } => raypack_gpu::BvhNode::internal(
                bounds.min(),
                bounds.max(),
                first_child.get(),
            ),

            BvhNode::Leaf {
                bounds,
                primitives_ref,
            } => raypack_gpu::BvhNode::leaf(
                bounds.min(),
                bounds.max(),
                primitives_ref.start(),
                primitives_ref.len(),
            ),

            BvhNode::Unused => Default::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BvhNodeId(u32);

impl BvhNodeId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn root() -> Self {
        Self::new(0)
    }

    pub fn get(&self) -> u32 {
        self.0
    }

    pub fn next(&self) -> Self {
        Self::new(self.0 + 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SplittingPlane {
    pub split_by: Axis,
    pub split_at: f32,
}
