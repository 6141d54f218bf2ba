use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Triangle {
    pub vertex_ids: [u32; 3],
    pub material_id: u32,
}

impl Triangle {
    pub fn new(vertex_ids: [u32; 3], material_id: u32) -> Self {
        Self {
            vertex_ids,
            material_id,
        }
    }

    /// Moves this triangle from a model-local index space into the global
    /// one.
    pub fn rebased(self, vertex_offset: u32, material_offset: u32) -> Self {
        Self {
            vertex_ids: self.vertex_ids.map(|id| id + vertex_offset),
            material_id: self.material_id + material_offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebased() {
        let triangle = Triangle::new([0, 1, 2], 3).rebased(10, 100);

        assert_eq!([10, 11, 12], triangle.vertex_ids);
        assert_eq!(103, triangle.material_id);
    }
}
