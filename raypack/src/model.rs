use glam::{Vec2, Vec3};
use log::{debug, warn};
use raypack_gpu as gpu;

use crate::utils::metric;
use crate::{
    material, BoundingBox, Bvh, Face, Geometry, Material, MaterialLibrary,
    ModelError, TextureCache, TextureError,
};

/// Single mesh, ready to be merged into a scene.
///
/// Triangles are stored already reordered by the BVH, so that each leaf's
/// primitive range indexes [`Model::triangles()`] directly.
#[derive(Clone, Debug, Default)]
pub struct Model {
    name: String,
    vertices: Vec<gpu::Vertex>,
    triangles: Vec<gpu::Triangle>,
    materials: Vec<Material>,
    bvh: Bvh,
}

impl Model {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[gpu::Vertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[gpu::Triangle] {
        &self.triangles
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn bvh(&self) -> &Bvh {
        &self.bvh
    }

    /// Releases the texture references held by this model's materials.
    ///
    /// A model loaded through [`load_model()`](crate::load_model) owns one
    /// reference per textured material; call this once, when the model gets
    /// discarded.
    pub fn release_textures(
        &self,
        textures: &mut TextureCache,
    ) -> Result<(), TextureError> {
        material::release_textures(&self.materials, textures)
    }
}

/// Converts parsed [`Geometry`] into a [`Model`].
#[derive(Debug)]
pub struct ModelBuilder<'a> {
    geometry: &'a Geometry,
    library: &'a MaterialLibrary,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(geometry: &'a Geometry, library: &'a MaterialLibrary) -> Self {
        Self { geometry, library }
    }

    pub fn build(self) -> Result<Model, ModelError> {
        let _metric = metric("model::build");

        let mut materials: Vec<_> = self
            .library
            .iter()
            .map(|(_, material)| material.clone())
            .collect();

        if materials.is_empty() {
            materials.push(Material::default());
        }

        let face_count = self.geometry.face_count();
        let mut vertices = Vec::with_capacity(3 * face_count);
        let mut triangles = Vec::with_capacity(face_count);

        for sub_geometry in self.geometry.sub_geometries() {
            let material_id = self.resolve_material(sub_geometry.material());

            for face in sub_geometry.faces() {
                let first_vertex_id = vertices.len() as u32;

                for corner in 0..3 {
                    vertices.push(self.vertex(face, corner)?);
                }

                triangles.push(gpu::Triangle::new(
                    [first_vertex_id, first_vertex_id + 1, first_vertex_id + 2],
                    material_id,
                ));
            }
        }

        let (bvh, triangles) = if triangles.is_empty() {
            (Bvh::default(), triangles)
        } else {
            let position = |id: u32| vertices[id as usize].position;

            let bvh = Bvh::build(
                &triangles,
                |triangle| {
                    triangle.vertex_ids.into_iter().map(position).sum::<Vec3>()
                        / 3.0
                },
                |triangle| {
                    triangle
                        .vertex_ids
                        .into_iter()
                        .map(position)
                        .collect::<BoundingBox>()
                },
            )?;

            let triangles = bvh.reorder(&triangles);

            (bvh, triangles)
        };

        debug!(
            "Built model `{}`: {} vertices, {} triangle(s), {} material(s), {} BVH node(s) (depth: {})",
            self.geometry.name(),
            vertices.len(),
            triangles.len(),
            materials.len(),
            bvh.len(),
            bvh.depth(),
        );

        Ok(Model {
            name: self.geometry.name().to_owned(),
            vertices,
            triangles,
            materials,
            bvh,
        })
    }

    fn resolve_material(&self, name: Option<&str>) -> u32 {
        let Some(name) = name else {
            return 0;
        };

        match self.library.position(name) {
            Some(idx) => idx as u32,

            None => {
                warn!(
                    "Model `{}` uses unknown material `{}` - falling back to the first one",
                    self.geometry.name(),
                    name
                );

                0
            }
        }
    }

    fn vertex(&self, face: &Face, corner: usize) -> Result<gpu::Vertex, ModelError> {
        let positions = self.geometry.positions();
        let position_id = face.position_ids[corner];

        let position = positions.get(position_id as usize).copied().ok_or(
            ModelError::VertexOutOfBounds {
                index: position_id,
                len: positions.len(),
            },
        )?;

        let uv = if face.has_texcoords() {
            let texcoords = self.geometry.texcoords();
            let texcoord_id = face.texcoord_ids[corner];

            texcoords.get(texcoord_id as usize).copied().ok_or(
                ModelError::TexcoordOutOfBounds {
                    index: texcoord_id,
                    len: texcoords.len(),
                },
            )?
        } else {
            Vec2::ZERO
        };

        Ok(gpu::Vertex::new(position, uv))
    }
}
