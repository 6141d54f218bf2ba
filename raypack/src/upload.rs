/// One of the flat buffers making up [`SceneBuffers`](crate::SceneBuffers).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneBuffer {
    Ranges,
    Nodes,
    Materials,
    Triangles,
    Vertices,
}

impl SceneBuffer {
    pub const ALL: [Self; 5] = [
        Self::Ranges,
        Self::Nodes,
        Self::Materials,
        Self::Triangles,
        Self::Vertices,
    ];

    /// Returns the binding index under which the intersection stage expects
    /// this buffer.
    pub fn binding(self) -> u32 {
        match self {
            SceneBuffer::Ranges => 0,
            SceneBuffer::Nodes => 1,
            SceneBuffer::Materials => 2,
            SceneBuffer::Triangles => 3,
            SceneBuffer::Vertices => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SceneBuffer::Ranges => "raypack_ranges",
            SceneBuffer::Nodes => "raypack_nodes",
            SceneBuffer::Materials => "raypack_materials",
            SceneBuffer::Triangles => "raypack_triangles",
            SceneBuffer::Vertices => "raypack_vertices",
        }
    }
}

/// Something that can transfer scene buffers into device memory.
pub trait SceneUploader {
    /// Replaces the entire contents of `buffer` with `data`.
    fn write(&mut self, buffer: SceneBuffer, data: &[u8]);

    /// Overwrites `data.len()` bytes of `buffer`, starting at `offset`.
    fn write_at(&mut self, buffer: SceneBuffer, offset: usize, data: &[u8]);
}
