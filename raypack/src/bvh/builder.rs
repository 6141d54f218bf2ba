use glam::Vec3;

use super::{BvhNode, BvhNodeId, PrimitivesRef, SplittingPlane};
use crate::{Axis, BoundingBox};

/// Nodes holding this many primitives (or fewer) are never split.
pub const LEAF_THRESHOLD: u32 = 2;

/// Subdivides the tree in place, starting from the root that spans all of
/// `primitive_ids`.
///
/// `nodes` must have room for `2 * primitive_ids.len() - 1` nodes; children
/// are handed out in depth-first order, right after their parent's siblings,
/// and a slot is never handed out twice.
pub fn run(
    nodes: &mut [BvhNode],
    primitive_ids: &mut [u32],
    centers: &[Vec3],
    bounds: &[BoundingBox],
) {
    let mut builder = Builder {
        nodes,
        primitive_ids,
        centers,
        bounds,
        next_free_node: 1,
    };

    let root_ref = PrimitivesRef::new(0, builder.primitive_ids.len() as u32);

    let root_bounds = builder.bounds_of(root_ref);

    builder.nodes[0] = BvhNode::Leaf {
        bounds: root_bounds,
        primitives_ref: root_ref,
    };

    builder.subdivide(BvhNodeId::root());
}

struct Builder<'a> {
    nodes: &'a mut [BvhNode],
    primitive_ids: &'a mut [u32],
    centers: &'a [Vec3],
    bounds: &'a [BoundingBox],
    next_free_node: u32,
}

impl Builder<'_> {
    fn subdivide(&mut self, node_id: BvhNodeId) {
        let BvhNode::Leaf {
            bounds,
            primitives_ref,
        } = self.nodes[node_id.get() as usize]
        else {
            unreachable!();
        };

        if primitives_ref.len() <= LEAF_THRESHOLD {
            return;
        }

        let plane = Self::find_splitting_plane(bounds);
        let pivot = self.partition(primitives_ref, plane);

        // Everything landed on the same side of the plane (e.g. because all
        // of the centers are the same) - there's no point in splitting it
        // further, so this node stays a (larger) leaf
        if pivot == primitives_ref.start() || pivot == primitives_ref.end() {
            return;
        }

        let (left_ref, right_ref) = primitives_ref.split_at(pivot);

        let left_id = BvhNodeId::new(self.next_free_node);
        let right_id = left_id.next();

        self.next_free_node += 2;

        let left_bounds = self.bounds_of(left_ref);
        let right_bounds = self.bounds_of(right_ref);

        self.nodes[left_id.get() as usize] = BvhNode::Leaf {
            bounds: left_bounds,
            primitives_ref: left_ref,
        };

        self.nodes[right_id.get() as usize] = BvhNode::Leaf {
            bounds: right_bounds,
            primitives_ref: right_ref,
        };

        self.nodes[node_id.get() as usize] = BvhNode::Internal {
            bounds,
            first_child: left_id,
            plane,
        };

        self.subdivide(left_id);
        self.subdivide(right_id);
    }

    /// Spatial median of the node's widest axis.
    fn find_splitting_plane(bounds: BoundingBox) -> SplittingPlane {
        let extent = bounds.extent();
        let split_by = Axis::widest(extent);

        let split_at = bounds.min()[split_by as usize]
            + extent[split_by as usize] * 0.5;

        SplittingPlane { split_by, split_at }
    }

    /// Moves primitives whose center lies before `plane` to the front of
    /// `primitives_ref` and returns the index of the first one that doesn't.
    fn partition(
        &mut self,
        primitives_ref: PrimitivesRef,
        plane: SplittingPlane,
    ) -> u32 {
        let ids = &mut self.primitive_ids[primitives_ref.as_range()];
        let axis = plane.split_by as usize;

        let mut left = 0i64;
        let mut right = (ids.len() as i64) - 1;

        while left <= right {
            let center = self.centers[ids[left as usize] as usize];

            if center[axis] < plane.split_at {
                left += 1;
            } else {
                ids.swap(left as usize, right as usize);
                right -= 1;
            }
        }

        primitives_ref.start() + (left as u32)
    }

    fn bounds_of(&self, primitives_ref: PrimitivesRef) -> BoundingBox {
        self.primitive_ids[primitives_ref.as_range()]
            .iter()
            .map(|&id| self.bounds[id as usize])
            .collect()
    }
}
