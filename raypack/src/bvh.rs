mod builder;
mod node;
mod primitives;

use glam::Vec3;

pub use self::builder::LEAF_THRESHOLD;
pub use self::node::*;
pub use self::primitives::*;
use crate::utils::metric;
use crate::{BoundingBox, BvhError};

/// Binary bounding volume hierarchy over an arbitrary list of primitives.
///
/// Building doesn't touch the primitives themselves - instead the BVH keeps a
/// permutation of their indices, so that each leaf owns a contiguous range of
/// it; [`Bvh::reorder()`] can be used to apply that permutation.
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    primitive_ids: Vec<u32>,
}

impl Bvh {
    pub fn build<P>(
        primitives: &[P],
        center_fn: impl Fn(&P) -> Vec3,
        bounds_fn: impl Fn(&P) -> BoundingBox,
    ) -> Result<Self, BvhError> {
        let _metric = metric("bvh::build");

        if primitives.is_empty() {
            return Err(BvhError::NoPrimitives);
        }

        if primitives.len() > (1 << 31) {
            return Err(BvhError::TooManyPrimitives(primitives.len()));
        }

        let centers: Vec<_> = primitives.iter().map(&center_fn).collect();
        let bounds: Vec<_> = primitives.iter().map(&bounds_fn).collect();

        let mut nodes = vec![BvhNode::Unused; 2 * primitives.len() - 1];
        let mut primitive_ids: Vec<_> = (0..primitives.len() as u32).collect();

        builder::run(&mut nodes, &mut primitive_ids, &centers, &bounds);

        Ok(Self {
            nodes,
            primitive_ids,
        })
    }

    /// Returns all of the node slots, including the ones that are not
    /// reachable from the root (those are [`BvhNode::Unused`]).
    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn root(&self) -> Option<&BvhNode> {
        self.nodes.first()
    }

    /// Returns the permutation of primitive indices; a leaf with primitives
    /// `start..end` owns primitives `primitive_ids[start..end]`.
    pub fn primitive_ids(&self) -> &[u32] {
        &self.primitive_ids
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns `items` rearranged so that `result[i] == items[primitive_ids[i]]`.
    pub fn reorder<T>(&self, items: &[T]) -> Vec<T>
    where
        T: Clone,
    {
        assert_eq!(
            items.len(),
            self.primitive_ids.len(),
            "got {} items, but the BVH was built over {} primitives",
            items.len(),
            self.primitive_ids.len(),
        );

        self.primitive_ids
            .iter()
            .map(|&id| items[id as usize].clone())
            .collect()
    }

    /// Walks nodes reachable from the root, depth-first.
    pub fn iter_reachable(
        &self,
    ) -> impl Iterator<Item = (BvhNodeId, &BvhNode)> + '_ {
        let mut stack = Vec::new();

        if !self.nodes.is_empty() {
            stack.push(BvhNodeId::root());
        }

        std::iter::from_fn(move || {
            let id = stack.pop()?;
            let node = &self.nodes[id.get() as usize];

            if let Some((left_id, right_id)) = node.children() {
                stack.push(right_id);
                stack.push(left_id);
            }

            Some((id, node))
        })
    }

    pub fn leaf_count(&self) -> usize {
        self.iter_reachable()
            .filter(|(_, node)| node.is_leaf())
            .count()
    }

    /// Returns the number of levels in the tree (a lone root has depth 1).
    pub fn depth(&self) -> usize {
        self.depth_of(BvhNodeId::root())
    }

    fn depth_of(&self, id: BvhNodeId) -> usize {
        let Some(node) = self.nodes.get(id.get() as usize) else {
            return 0;
        };

        match node.children() {
            Some((left_id, right_id)) => {
                1 + self.depth_of(left_id).max(self.depth_of(right_id))
            }
            None => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::Axis;

    type Tri = [Vec3; 3];

    fn center(tri: &Tri) -> Vec3 {
        (tri[0] + tri[1] + tri[2]) / 3.0
    }

    fn bounds(tri: &Tri) -> BoundingBox {
        tri.iter().copied().collect()
    }

    fn build(tris: &[Tri]) -> Bvh {
        Bvh::build(tris, center, bounds).unwrap()
    }

    /// Small triangle lying around `(x, 0, 0)`.
    fn tri_at(x: f32) -> Tri {
        [vec3(x - 0.1, 0.0, 0.0), vec3(x + 0.1, 0.0, 0.0), vec3(x, 0.1, 0.0)]
    }

    fn random_tris(count: usize, seed: u64) -> Vec<Tri> {
        let mut rng = StdRng::seed_from_u64(seed);

        (0..count)
            .map(|_| {
                let origin = vec3(
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-50.0..50.0),
                    rng.gen_range(-50.0..50.0),
                );

                [0, 1, 2].map(|_| {
                    origin
                        + vec3(
                            rng.gen_range(-1.0..1.0),
                            rng.gen_range(-1.0..1.0),
                            rng.gen_range(-1.0..1.0),
                        )
                })
            })
            .collect()
    }

    fn assert_invariants(bvh: &Bvh, tris: &[Tri]) {
        assert_eq!(2 * tris.len() - 1, bvh.len());

        // Permutation is a bijection
        let mut ids = bvh.primitive_ids().to_vec();
        ids.sort_unstable();
        assert!(ids.iter().copied().eq(0..tris.len() as u32));

        let mut seen = vec![0; tris.len()];
        let mut reachable = vec![false; bvh.len()];

        for (id, node) in bvh.iter_reachable() {
            reachable[id.get() as usize] = true;

            match *node {
                BvhNode::Internal {
                    bounds: parent_bb,
                    first_child,
                    ..
                } => {
                    assert!(first_child > id);

                    let left_bb = bvh.nodes()[first_child.get() as usize].bounds();
                    let right_bb =
                        bvh.nodes()[first_child.next().get() as usize].bounds();

                    assert!(parent_bb.contains(&left_bb));
                    assert!(parent_bb.contains(&right_bb));
                    assert_eq!(parent_bb, left_bb + right_bb);
                }

                BvhNode::Leaf {
                    bounds: leaf_bb,
                    primitives_ref,
                } => {
                    assert!(!primitives_ref.is_empty());

                    let expected: BoundingBox = bvh.primitive_ids()
                        [primitives_ref.as_range()]
                    .iter()
                    .map(|&id| bounds(&tris[id as usize]))
                    .collect();

                    assert_eq!(expected, leaf_bb);

                    for &prim_id in
                        &bvh.primitive_ids()[primitives_ref.as_range()]
                    {
                        seen[prim_id as usize] += 1;
                    }
                }

                BvhNode::Unused => {
                    panic!("unused node {id:?} is reachable");
                }
            }

            assert_eq!(node.is_leaf(), node.prim_count() > 0);
        }

        // Every primitive belongs to exactly one leaf
        assert!(seen.iter().all(|&count| count == 1));

        // ... and whatever's not reachable has been left alone
        for (node, reachable) in bvh.nodes().iter().zip(reachable) {
            if !reachable {
                assert_eq!(BvhNode::Unused, *node);
            }
        }
    }

    #[test]
    fn no_primitives() {
        let tris: Vec<Tri> = Vec::new();

        assert_eq!(
            BvhError::NoPrimitives,
            Bvh::build(&tris, center, bounds).unwrap_err()
        );
    }

    #[test]
    fn single_primitive() {
        let tris = [tri_at(1.0)];
        let bvh = build(&tris);

        assert_eq!(1, bvh.len());
        assert_eq!(1, bvh.root().unwrap().prim_count());
        assert_eq!(bounds(&tris[0]), bvh.root().unwrap().bounds());
        assert_eq!(1, bvh.depth());
        assert_invariants(&bvh, &tris);
    }

    #[test]
    fn two_primitives_form_a_leaf() {
        let tris = [tri_at(-100.0), tri_at(100.0)];
        let bvh = build(&tris);

        assert_eq!(3, bvh.len());
        assert_eq!(2, bvh.root().unwrap().prim_count());
        assert_eq!(BvhNode::Unused, bvh.nodes()[1]);
        assert_eq!(BvhNode::Unused, bvh.nodes()[2]);
        assert_invariants(&bvh, &tris);
    }

    #[test]
    fn colinear_split() {
        let tris = [tri_at(10.0), tri_at(0.0), tri_at(4.0)];
        let bvh = build(&tris);
        let root = bvh.root().unwrap();
        let bb = root.bounds();
        let plane = root.plane().unwrap();

        assert_eq!(Axis::X, plane.split_by);
        assert_relative_eq!(
            bb.min().x + (bb.max().x - bb.min().x) / 2.0,
            plane.split_at
        );

        assert_eq!(
            Some((BvhNodeId::new(1), BvhNodeId::new(2))),
            root.children()
        );

        // Left: x = 0 and x = 4, right: x = 10
        let left = &bvh.nodes()[1];
        let right = &bvh.nodes()[2];

        assert_eq!(Some(PrimitivesRef::new(0, 2)), left.primitives_ref());
        assert_eq!(Some(PrimitivesRef::new(2, 3)), right.primitives_ref());
        assert_eq!(&[2, 1, 0], bvh.primitive_ids());

        assert_eq!(3, bvh.iter_reachable().count());
        assert_eq!(2, bvh.leaf_count());
        assert_eq!(2, bvh.depth());
        assert_invariants(&bvh, &tris);
    }

    #[test]
    fn children_are_allocated_depth_first() {
        let tris: Vec<_> = (0..4).map(|x| tri_at(x as f32 * 10.0)).collect();
        let bvh = build(&tris);

        // root -> (1, 2); left half (1) has 2 prims and stays a leaf,
        // right half (2) too - so nothing else gets allocated
        assert_eq!(
            Some((BvhNodeId::new(1), BvhNodeId::new(2))),
            bvh.root().unwrap().children()
        );
        assert_eq!(2, bvh.nodes()[1].prim_count());
        assert_eq!(2, bvh.nodes()[2].prim_count());

        let tris: Vec<_> = [0.0, 1.0, 2.0, 100.0]
            .into_iter()
            .map(tri_at)
            .collect();

        let bvh = build(&tris);

        // root -> (1, 2); left half (1) holds 3 prims and gets split into
        // (3, 4) before the right half is visited
        assert_eq!(
            Some((BvhNodeId::new(3), BvhNodeId::new(4))),
            bvh.nodes()[1].children()
        );
        assert_eq!(1, bvh.nodes()[2].prim_count());
        assert_eq!(3, bvh.depth());
        assert_invariants(&bvh, &tris);
    }

    #[test]
    fn degenerate_split_keeps_leaf() {
        let tris = vec![tri_at(3.0); 5];
        let bvh = build(&tris);

        assert_eq!(9, bvh.len());
        assert_eq!(5, bvh.root().unwrap().prim_count());
        assert_eq!(1, bvh.iter_reachable().count());
        assert_invariants(&bvh, &tris);
    }

    #[test]
    fn widest_axis_is_used() {
        let tris: Vec<Tri> = [0.0, 5.0, 20.0]
            .into_iter()
            .map(|z| {
                [vec3(0.0, 0.0, z), vec3(1.0, 0.0, z), vec3(0.0, 1.0, z + 0.5)]
            })
            .collect();

        let bvh = build(&tris);
        let plane = bvh.root().unwrap().plane().unwrap();

        assert_eq!(Axis::Z, plane.split_by);
        assert_relative_eq!(10.25, plane.split_at);
        assert_invariants(&bvh, &tris);
    }

    #[test]
    fn random_scenes() {
        for (count, seed) in [(3, 1), (17, 2), (100, 3), (1000, 4)] {
            let tris = random_tris(count, seed);
            let bvh = build(&tris);

            assert_invariants(&bvh, &tris);
        }
    }

    #[test]
    fn reorder() {
        let tris = [tri_at(10.0), tri_at(0.0), tri_at(4.0)];
        let bvh = build(&tris);
        let reordered = bvh.reorder(&tris);

        for (leaf_id, leaf) in bvh.iter_reachable() {
            let Some(primitives_ref) = leaf.primitives_ref() else {
                continue;
            };

            let actual: BoundingBox =
                reordered[primitives_ref.as_range()].iter().map(bounds).collect();

            assert_eq!(leaf.bounds(), actual, "leaf {leaf_id:?}");
        }
    }
}
