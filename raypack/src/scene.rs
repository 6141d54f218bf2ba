use std::mem;
use std::ops::Range;

use glam::Mat4;
use log::{debug, warn};
use raypack_gpu as gpu;

use crate::utils::metric;
use crate::{
    load_model, BvhNode, Error, LoaderConfig, MergeError, Model, SceneBuffer,
    SceneUploader, TextureCache, TextureError,
};

/// All of the scene's models packed into flat, device-ready arrays.
///
/// Each model occupies a contiguous run of every array, in the order the
/// models were merged in; all indices (node children, leaf primitives,
/// triangle vertices and materials) point into the merged arrays.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneBuffers {
    ranges: Vec<gpu::BvhRange>,
    nodes: Vec<gpu::BvhNode>,
    materials: Vec<gpu::Material>,
    triangles: Vec<gpu::Triangle>,
    vertices: Vec<gpu::Vertex>,
}

impl SceneBuffers {
    /// Merges given models; a `None` aborts the whole merge.
    pub fn merge<'a>(
        models: impl IntoIterator<Item = Option<&'a Model>>,
    ) -> Result<Self, MergeError> {
        let _metric = metric("scene::merge");

        let mut this = Self::default();
        let mut cursor = MergeCursor::default();

        for (index, model) in models.into_iter().enumerate() {
            let model = model.ok_or(MergeError::MissingModel { index })?;
            let next_cursor = cursor.advance(model)?;

            this.ranges.push(gpu::BvhRange::new(
                cursor.node,
                model.bvh().len() as u32,
            ));

            this.nodes
                .extend(model.bvh().nodes().iter().map(|node| match node {
                    BvhNode::Unused => Default::default(),
                    node => node.serialize().rebased(cursor.node, cursor.triangle),
                }));

            this.materials
                .extend(model.materials().iter().map(|material| material.serialize()));

            this.triangles.extend(
                model
                    .triangles()
                    .iter()
                    .map(|triangle| triangle.rebased(cursor.vertex, cursor.material)),
            );

            this.vertices.extend_from_slice(model.vertices());

            cursor = next_cursor;
        }

        debug!(
            "Merged {} model(s): {} node(s), {} material(s), {} triangle(s), {} vertices",
            this.ranges.len(),
            this.nodes.len(),
            this.materials.len(),
            this.triangles.len(),
            this.vertices.len(),
        );

        Ok(this)
    }

    pub fn from_models(models: &[Model]) -> Result<Self, MergeError> {
        Self::merge(models.iter().map(Some))
    }

    pub fn ranges(&self) -> &[gpu::BvhRange] {
        &self.ranges
    }

    pub fn nodes(&self) -> &[gpu::BvhNode] {
        &self.nodes
    }

    pub fn materials(&self) -> &[gpu::Material] {
        &self.materials
    }

    pub fn triangles(&self) -> &[gpu::Triangle] {
        &self.triangles
    }

    pub fn vertices(&self) -> &[gpu::Vertex] {
        &self.vertices
    }

    /// Returns the raw contents of given buffer.
    pub fn bytes(&self, buffer: SceneBuffer) -> &[u8] {
        match buffer {
            SceneBuffer::Ranges => bytemuck::cast_slice(&self.ranges),
            SceneBuffer::Nodes => bytemuck::cast_slice(&self.nodes),
            SceneBuffer::Materials => bytemuck::cast_slice(&self.materials),
            SceneBuffer::Triangles => bytemuck::cast_slice(&self.triangles),
            SceneBuffer::Vertices => bytemuck::cast_slice(&self.vertices),
        }
    }

    /// Replaces transform of given model, leaving everything else intact.
    ///
    /// Returns which bytes of [`SceneBuffer::Ranges`] have changed.
    pub fn update_model_transform(
        &mut self,
        index: usize,
        transform: Mat4,
    ) -> Result<Range<usize>, MergeError> {
        let len = self.ranges.len();

        let range = self
            .ranges
            .get_mut(index)
            .ok_or(MergeError::UnknownModel { index, len })?;

        range.transform = transform;

        let start =
            index * mem::size_of::<gpu::BvhRange>() + gpu::BvhRange::TRANSFORM_OFFSET;

        Ok(start..start + mem::size_of::<Mat4>())
    }

    /// Sends all of the buffers to the device.
    pub fn upload(&self, uploader: &mut dyn SceneUploader) {
        for buffer in SceneBuffer::ALL {
            let data = self.bytes(buffer);

            debug!(
                "Uploading `{}` (binding {}): {} bytes",
                buffer.label(),
                buffer.binding(),
                data.len()
            );

            uploader.write(buffer, data);
        }
    }

    /// Updates transform of given model and sends just that transform to the
    /// device.
    pub fn upload_model_transform(
        &mut self,
        index: usize,
        transform: Mat4,
        uploader: &mut dyn SceneUploader,
    ) -> Result<(), MergeError> {
        let bytes = self.update_model_transform(index, transform)?;
        let data = &self.bytes(SceneBuffer::Ranges)[bytes.clone()];

        uploader.write_at(SceneBuffer::Ranges, bytes.start, data);

        Ok(())
    }
}

/// Where the next model's data starts in each of the merged arrays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct MergeCursor {
    vertex: u32,
    triangle: u32,
    material: u32,
    node: u32,
}

impl MergeCursor {
    /// Returns the cursor positioned right after `model`; fails if any of
    /// the arrays would outgrow 32-bit indices.
    fn advance(self, model: &Model) -> Result<Self, MergeError> {
        Ok(Self {
            vertex: checked_add(self.vertex, model.vertices().len(), "vertices")?,
            triangle: checked_add(
                self.triangle,
                model.triangles().len(),
                "triangles",
            )?,
            material: checked_add(
                self.material,
                model.materials().len(),
                "materials",
            )?,
            node: checked_add(self.node, model.bvh().len(), "nodes")?,
        })
    }
}

fn checked_add(
    offset: u32,
    len: usize,
    what: &'static str,
) -> Result<u32, MergeError> {
    u32::try_from(len)
        .ok()
        .and_then(|len| offset.checked_add(len))
        .ok_or(MergeError::Overflow { what })
}

/// Loaded models together with their merged buffers.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    models: Vec<Model>,
    buffers: SceneBuffers,
}

impl Scene {
    /// Loads all of given models (in order) and merges them.
    ///
    /// Any failure aborts the entire load, releasing textures of the models
    /// loaded up to that point.
    pub fn load<S>(
        config: &LoaderConfig,
        textures: &mut TextureCache,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Self, Error>
    where
        S: AsRef<str>,
    {
        let mut models = Vec::new();

        for name in names {
            match load_model(config, textures, name.as_ref()) {
                Ok(model) => models.push(model),

                Err(err) => {
                    Self::discard(&models, textures);
                    return Err(err);
                }
            }
        }

        match SceneBuffers::from_models(&models) {
            Ok(buffers) => Ok(Self { models, buffers }),

            Err(err) => {
                Self::discard(&models, textures);
                Err(err.into())
            }
        }
    }

    /// Releases textures held by the scene's models.
    pub fn unload(self, textures: &mut TextureCache) -> Result<(), TextureError> {
        for model in &self.models {
            model.release_textures(textures)?;
        }

        Ok(())
    }

    fn discard(models: &[Model], textures: &mut TextureCache) {
        for model in models {
            if let Err(err) = model.release_textures(textures) {
                warn!(
                    "Couldn't release textures of `{}`: {}",
                    model.name(),
                    err
                );
            }
        }
    }

    pub fn models(&self) -> &[Model] {
        &self.models
    }

    pub fn buffers(&self) -> &SceneBuffers {
        &self.buffers
    }

    pub fn buffers_mut(&mut self) -> &mut SceneBuffers {
        &mut self.buffers
    }
}
